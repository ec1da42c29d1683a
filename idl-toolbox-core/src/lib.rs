//! # IDL Toolbox Core
//!
//! Schema types, hydration, native layout and the binary codec used to read
//! and write on-chain program payloads from an IDL document.

pub mod bytes;
pub mod codec;
pub mod error;
pub mod flat;
pub mod full;
pub mod hydrate;
pub mod layout;
pub mod parse;
pub mod path;
pub mod primitive;

pub mod prelude {
    pub use crate::codec::{decode, decode_fields, encode, encode_fields, encode_into};
    pub use crate::error::{Context, ErrorKind, IdlError, IdlResult};
    pub use crate::flat::{FlatFields, FlatType, Typedef, Typedefs};
    pub use crate::full::{FullFields, FullType, Hydrated};
    pub use crate::hydrate::{hydrate, hydrate_fields, hydrate_type, GenericBindings};
    pub use crate::parse::{parse_fields, parse_flat, parse_typedefs};
    pub use crate::path::{IdlPath, PathToken};
    pub use crate::primitive::{Prefix, Primitive};
}
