#![allow(dead_code)]

use idl_toolbox::pda::pubkey_to_string;
use idl_toolbox::program::IdlProgram;
use serde_json::{json, Value};
use solana_pubkey::Pubkey;

pub fn program_id() -> Pubkey {
    Pubkey::new_from_array([7; 32])
}

pub fn key(byte: u8) -> Pubkey {
    Pubkey::new_from_array([byte; 32])
}

pub fn vault_idl() -> Value {
    json!({
        "address": pubkey_to_string(&program_id()),
        "metadata": {"name": "vault", "version": "0.1.0", "spec": "0.1.0"},
        "docs": ["Holds deposits"],
        "types": [
            {"name": "Vault", "type": {"kind": "struct", "fields": [
                {"name": "owner", "type": "pubkey"},
                {"name": "id", "type": "u64"},
                {"name": "label", "type": "string"},
            ]}},
            {"name": "Config", "type": {"kind": "struct", "fields": [
                {"name": "admin", "type": "pubkey"},
                {"name": "feeBps", "type": "u16"},
            ]}},
            {"name": "Deposited", "type": {"kind": "struct", "fields": [
                {"name": "vault", "type": "pubkey"},
                {"name": "amount", "type": "u64"},
            ]}},
        ],
        "accounts": [
            {"name": "Vault"},
            {"name": "Config", "discriminator": [1, 2, 3, 4, 5, 6, 7, 8], "space": 42},
            {
                "name": "Legacy",
                "discriminator": [],
                "space": 4,
                "blobs": [{"offset": 0, "value": [170]}],
                "type": {"kind": "struct", "fields": [
                    {"name": "tag", "type": "u8"},
                    {"name": "count", "type": "u16"},
                ]},
            },
        ],
        "instructions": [
            {
                "name": "initialize",
                "accounts": [
                    {"name": "authority", "writable": true, "signer": true},
                    {"name": "vault", "writable": true, "pda": {"seeds": [
                        {"kind": "const", "value": [118, 97, 117, 108, 116]},
                        {"kind": "account", "path": "authority"},
                        {"kind": "arg", "path": "label"},
                    ]}},
                    {"name": "system_program", "address": "11111111111111111111111111111111"},
                ],
                "args": [{"name": "label", "type": "string"}],
            },
            {
                "name": "deposit",
                "accounts": [
                    {"name": "vault", "writable": true},
                    {"name": "receipt", "writable": true, "pda": {"seeds": [
                        {"kind": "const", "type": "string", "value": "receipt"},
                        {"kind": "account", "path": "vault.owner", "account": "Vault"},
                        {"kind": "account", "path": "vault.id"},
                    ]}},
                    {"name": "signers", "accounts": [
                        {"name": "depositor", "signer": true},
                    ]},
                    {"name": "referrer", "optional": true},
                ],
                "args": [{"name": "amount", "type": "u64"}],
            },
            {
                "name": "tangle",
                "accounts": [
                    {"name": "left", "pda": {"seeds": [{"kind": "account", "path": "right"}]}},
                    {"name": "right", "pda": {"seeds": [{"kind": "account", "path": "left"}]}},
                ],
                "args": [],
            },
        ],
        "events": [{"name": "Deposited"}],
        "errors": [
            {"code": 6000, "name": "Unauthorized", "msg": "Signer is not the vault owner"},
            {"code": 6001, "name": "Empty"},
        ],
        "constants": [{"name": "MAX_VAULTS", "type": "u16", "value": "10"}],
    })
}

pub fn vault_program() -> IdlProgram {
    IdlProgram::parse(&vault_idl()).unwrap()
}
