//! Human-readable summary of a program document.

use std::fmt::Write;

use idl_toolbox::instruction_account::IdlInstructionAccount;
use idl_toolbox::pda::pubkey_to_string;
use idl_toolbox::program::IdlProgram;
use idl_toolbox_core::full::FullFields;

use crate::error::CliResult;

pub fn run(program: &IdlProgram) -> CliResult<String> {
    let mut out = String::new();
    write_summary(&mut out, program)?;
    Ok(out)
}

fn write_summary(out: &mut String, program: &IdlProgram) -> std::fmt::Result {
    let metadata = &program.metadata;
    writeln!(
        out,
        "🔧 {} v{}",
        metadata.name.as_deref().unwrap_or("<unnamed>"),
        metadata.version.as_deref().unwrap_or("?")
    )?;
    if let Some(address) = &metadata.address {
        writeln!(out, "   address: {}", pubkey_to_string(address))?;
    }
    for line in metadata.description.iter().chain(&metadata.docs) {
        writeln!(out, "   {}", line)?;
    }

    writeln!(out)?;
    writeln!(out, "ACCOUNTS:")?;
    for account in program.accounts.values() {
        let space = account
            .space
            .map(|space| format!(" ({} bytes)", space))
            .unwrap_or_default();
        writeln!(
            out,
            "  {:<24} {}{} [{}]",
            account.name,
            account.content.describe(),
            space,
            hex::encode(&account.discriminator)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "INSTRUCTIONS:")?;
    for instruction in program.instructions.values() {
        writeln!(
            out,
            "  {:<24} {} account(s), {} arg(s) [{}]",
            instruction.name,
            instruction.accounts.len(),
            instruction.args.len(),
            hex::encode(&instruction.discriminator)
        )?;
        for account in &instruction.accounts {
            writeln!(out, "    {}", account_line(account))?;
        }
        if let FullFields::Named(args) = &instruction.args {
            for arg in args {
                writeln!(out, "    --{:<22} {}", arg.name, arg.content.describe())?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "EVENTS:")?;
    for event in program.events.values() {
        writeln!(
            out,
            "  {:<24} {} [{}]",
            event.name,
            event.content.describe(),
            hex::encode(&event.discriminator)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "ERRORS:")?;
    for error in program.errors.values() {
        writeln!(
            out,
            "  {:<6} {:<24} {}",
            error.code,
            error.name,
            error.msg.as_deref().unwrap_or("")
        )?;
    }

    writeln!(out)?;
    writeln!(out, "CONSTANTS:")?;
    for constant in program.constants.values() {
        writeln!(
            out,
            "  {:<24} {} = {}",
            constant.name,
            constant.content.describe(),
            constant.value
        )?;
    }
    Ok(())
}

fn account_line(account: &IdlInstructionAccount) -> String {
    let mut flags = vec![];
    if account.writable {
        flags.push("mut");
    }
    if account.signer {
        flags.push("signer");
    }
    if account.optional {
        flags.push("optional");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    let source = match (&account.address, &account.pda) {
        (Some(address), _) => format!(" = {}", pubkey_to_string(address)),
        (None, Some(pda)) => format!(" (PDA, {} seed(s))", pda.seeds.len()),
        (None, None) => String::new(),
    };
    format!("{}{}{}", account.name, flags, source)
}
