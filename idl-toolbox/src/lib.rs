//! # IDL Toolbox
//!
//! Reads a program's IDL document and uses it to encode, decode and
//! recognise account data, instructions and events, and to resolve the
//! addresses an instruction needs.

pub mod account;
pub mod blob;
pub mod constant;
pub mod discriminator;
pub mod event;
pub mod instruction;
pub mod instruction_account;
pub mod pda;
pub mod program;
pub mod program_error;
pub mod resolve;

pub use idl_toolbox_core;

pub mod prelude {
    pub use crate::account::IdlAccount;
    pub use crate::blob::InstructionBlob;
    pub use crate::event::IdlEvent;
    pub use crate::instruction::IdlInstruction;
    pub use crate::instruction_account::{IdlInstructionAccount, IdlPda};
    pub use crate::pda::derive_pda;
    pub use crate::program::IdlProgram;
    pub use crate::resolve::{find_addresses, AccountFetcher, AccountState};
    pub use idl_toolbox_core::error::{ErrorKind, IdlError, IdlResult};
}
