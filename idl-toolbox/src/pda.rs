//! Program derived addresses.

use idl_toolbox_core::bytes::pubkey_from_str;
use idl_toolbox_core::error::{IdlError, IdlResult};
use solana_pubkey::Pubkey;

pub const MAX_SEEDS: usize = 16;
pub const MAX_SEED_LEN: usize = 32;

/// Find the canonical PDA of `program_id` for `seeds`, with its bump.
pub fn derive_pda(program_id: &Pubkey, seeds: &[Vec<u8>]) -> IdlResult<(Pubkey, u8)> {
    if seeds.len() > MAX_SEEDS {
        return Err(IdlError::resolution(format!(
            "{} seeds given, at most {} allowed",
            seeds.len(),
            MAX_SEEDS
        )));
    }
    for (index, seed) in seeds.iter().enumerate() {
        if seed.len() > MAX_SEED_LEN {
            return Err(IdlError::resolution(format!(
                "seed [{}] is {} bytes, at most {} allowed",
                index,
                seed.len(),
                MAX_SEED_LEN
            )));
        }
    }
    let seeds: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();
    Pubkey::try_find_program_address(&seeds, program_id)
        .ok_or_else(|| IdlError::resolution("no viable bump seed for program derived address"))
}

pub fn parse_pubkey(text: &str) -> IdlResult<Pubkey> {
    Ok(Pubkey::new_from_array(pubkey_from_str(text)?))
}

pub fn pubkey_from_bytes(bytes: &[u8]) -> IdlResult<Pubkey> {
    let array = <[u8; 32]>::try_from(bytes).map_err(|_| {
        IdlError::resolution(format!("expected 32 address bytes, got {}", bytes.len()))
    })?;
    Ok(Pubkey::new_from_array(array))
}

pub fn pubkey_to_string(pubkey: &Pubkey) -> String {
    idl_toolbox_core::bytes::pubkey_to_string(pubkey.as_ref())
}
