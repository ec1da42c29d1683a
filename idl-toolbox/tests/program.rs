mod common;

use std::collections::HashMap;

use borsh::BorshSerialize;
use common::{key, program_id, vault_idl, vault_program};
use idl_toolbox::account::IdlAccount;
use idl_toolbox::discriminator::{account_discriminator, instruction_discriminator};
use idl_toolbox::pda::pubkey_to_string;
use idl_toolbox::program::IdlProgram;
use idl_toolbox_core::error::{ErrorKind, IdlError};
use serde_json::json;
use sha2::{Digest, Sha256};

#[derive(BorshSerialize)]
struct Vault {
    owner: [u8; 32],
    id: u64,
    label: String,
}

#[test]
fn test_metadata() {
    let program = vault_program();
    assert_eq!(program.metadata.name.as_deref(), Some("vault"));
    assert_eq!(program.metadata.version.as_deref(), Some("0.1.0"));
    assert_eq!(program.metadata.address, Some(program_id()));
    assert_eq!(program.metadata.docs, vec!["Holds deposits".to_string()]);
    let names: Vec<&str> = program.instructions.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["initialize", "deposit", "tangle"]);
}

#[test]
fn test_from_json_rejects_bad_input() {
    let err = IdlProgram::from_json("{not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);

    let mut idl = vault_idl();
    idl["accounts"] = json!([{"name": "Ghost"}]);
    let err = IdlProgram::parse(&idl).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Hydration);
    assert_eq!(err.breadcrumbs(), vec!["account Ghost"]);
}

#[test]
fn test_default_discriminators() {
    let hash = Sha256::digest(b"account:Vault");
    assert_eq!(account_discriminator("Vault"), hash[..8].to_vec());
    let program = vault_program();
    assert_eq!(program.accounts["Vault"].discriminator, hash[..8].to_vec());
    assert_eq!(program.accounts["Config"].discriminator, vec![1, 2, 3, 4, 5, 6, 7, 8]);

    let hash = Sha256::digest(b"global:initialize_vault");
    assert_eq!(instruction_discriminator("initializeVault"), hash[..8].to_vec());
    let hash = Sha256::digest(b"event:Deposited");
    assert_eq!(program.events["Deposited"].discriminator, hash[..8].to_vec());
}

#[test]
fn test_account_matches_borsh() {
    let program = vault_program();
    let vault = &program.accounts["Vault"];
    let state = json!({"owner": pubkey_to_string(&key(3)), "id": "9", "label": "main"});
    let data = vault.encode(&state).unwrap();

    let mut expected = vault.discriminator.clone();
    expected.extend(
        borsh::to_vec(&Vault {
            owner: [3; 32],
            id: 9,
            label: "main".to_string(),
        })
        .unwrap(),
    );
    assert_eq!(data, expected);
    assert_eq!(vault.decode(&data).unwrap(), state);
}

#[test]
fn test_account_space_and_blobs() {
    let program = vault_program();
    let config = &program.accounts["Config"];
    let data = config
        .encode(&json!({"admin": pubkey_to_string(&key(1)), "feeBps": 50}))
        .unwrap();
    assert_eq!(data.len(), 42);
    assert_eq!(
        config.decode(&data).unwrap(),
        json!({"admin": pubkey_to_string(&key(1)), "fee_bps": 50})
    );
    let err = config.check(&data[..41]).unwrap_err();
    assert!(err.to_string().contains("expected 42 bytes"));

    let legacy = &program.accounts["Legacy"];
    let data = legacy.encode(&json!({"tag": 0, "count": 3})).unwrap();
    assert_eq!(data, vec![0xaa, 3, 0, 0]);
    assert!(legacy.check(&[0xab, 3, 0, 0]).is_err());
}

#[test]
fn test_blob_offsets_past_usize_fail_cleanly() {
    let typedefs = Default::default();
    let far = IdlAccount::parse(
        "Far",
        &json!({
            "discriminator": [],
            "blobs": [{"offset": u64::MAX, "value": [1, 2]}],
            "type": {"kind": "struct", "fields": [{"name": "tag", "type": "u8"}]},
        }),
        &typedefs,
    )
    .unwrap();
    let err = far.encode(&json!({"tag": 1})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
    assert_eq!(err.breadcrumbs(), vec!["account Far", "blob at offset 18446744073709551615"]);
    assert!(far.check(&[1]).is_err());

    let huge = IdlAccount::parse(
        "Huge",
        &json!({"discriminator": [], "space": u64::MAX, "type": {"kind": "struct", "fields": null}}),
        &typedefs,
    )
    .unwrap();
    assert_eq!(huge.encode(&json!({})).unwrap_err().kind(), ErrorKind::Codec);
}

#[test]
fn test_guess_account() {
    let program = vault_program();
    let vault = program.accounts["Vault"]
        .encode(&json!({"owner": pubkey_to_string(&key(3)), "id": 1, "label": ""}))
        .unwrap();
    assert_eq!(program.guess_account(&vault).unwrap().name, "Vault");
    assert_eq!(program.guess_account(&[0xaa, 1, 0, 0]).unwrap().name, "Legacy");

    let err = program.guess_account(&[0xab, 1, 0, 0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMatch);
    let IdlError::NoMatch { kind, attempts } = err else {
        panic!("expected NoMatch");
    };
    assert_eq!(kind, "account");
    let names: Vec<&str> = attempts.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["Vault", "Config", "Legacy"]);
}

#[test]
fn test_instruction_data() {
    let program = vault_program();
    let deposit = &program.instructions["deposit"];
    let data = deposit.encode_data(&json!({"amount": 500})).unwrap();
    let mut expected = instruction_discriminator("deposit");
    expected.extend(500u64.to_le_bytes());
    assert_eq!(data, expected);
    assert_eq!(deposit.decode_data(&data).unwrap(), json!({"amount": "500"}));

    assert_eq!(program.guess_instruction(&data).unwrap().name, "deposit");
    let tangle = program.instructions["tangle"].encode_data(&json!(null)).unwrap();
    assert_eq!(program.instructions["tangle"].decode_data(&tangle).unwrap(), json!({}));

    let err = program.guess_instruction(&[0; 8]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMatch);
    assert!(err.to_string().starts_with("no instruction matched"));
}

#[test]
fn test_nested_accounts_are_flattened() {
    let program = vault_program();
    let names: Vec<&str> = program.instructions["deposit"]
        .accounts
        .iter()
        .map(|account| account.name.as_str())
        .collect();
    assert_eq!(names, vec!["vault", "receipt", "depositor", "referrer"]);
}

#[test]
fn test_instruction_encode_and_decode() {
    let program = vault_program();
    let deposit = &program.instructions["deposit"];
    let addresses = HashMap::from([
        ("vault".to_string(), key(1)),
        ("receipt".to_string(), key(2)),
        ("depositor".to_string(), key(3)),
    ]);
    let instruction = deposit
        .encode(&program_id(), &addresses, &json!({"amount": "5"}))
        .unwrap();
    assert_eq!(instruction.program_id, program_id());
    assert_eq!(instruction.accounts.len(), 4);
    assert!(instruction.accounts[0].is_writable);
    assert!(!instruction.accounts[0].is_signer);
    assert!(instruction.accounts[2].is_signer);
    assert!(!instruction.accounts[2].is_writable);
    // Missing optional account stands in as the program id.
    assert_eq!(instruction.accounts[3].pubkey, program_id());

    let (decoded, args) = deposit.decode(&instruction).unwrap();
    assert_eq!(args, json!({"amount": "5"}));
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded["receipt"], key(2));
    assert!(!decoded.contains_key("referrer"));

    let err = deposit
        .encode(&program_id(), &HashMap::new(), &json!({"amount": 1}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resolution);
}

#[test]
fn test_camel_case_addresses_accepted() {
    let program = vault_program();
    let initialize = &program.instructions["initialize"];
    let addresses = HashMap::from([
        ("authority".to_string(), key(1)),
        ("vault".to_string(), key(2)),
        ("systemProgram".to_string(), key(0)),
    ]);
    let instruction = initialize
        .encode(&program_id(), &addresses, &json!({"label": "a"}))
        .unwrap();
    assert_eq!(instruction.accounts[2].pubkey, key(0));
}

#[test]
fn test_events() {
    let program = vault_program();
    let event = &program.events["Deposited"];
    let payload = json!({"vault": pubkey_to_string(&key(4)), "amount": "12"});
    let data = event.encode(&payload).unwrap();
    assert_eq!(event.decode(&data).unwrap(), payload);
    assert_eq!(program.guess_event(&data).unwrap().name, "Deposited");
    assert!(program.guess_event(&data[..10]).is_err());
}

#[test]
fn test_errors_and_constants() {
    let program = vault_program();
    let error = program.guess_error(6000).unwrap();
    assert_eq!(error.name, "Unauthorized");
    assert_eq!(error.msg.as_deref(), Some("Signer is not the vault owner"));
    assert_eq!(program.guess_error(6001).unwrap().msg, None);
    assert!(program.guess_error(42).is_none());

    let constant = &program.constants["MAX_VAULTS"];
    assert_eq!(constant.value, json!("10"));
    assert_eq!(constant.encode().unwrap(), vec![10, 0]);
}
