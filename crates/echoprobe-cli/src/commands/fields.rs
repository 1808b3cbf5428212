//! Segment field listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use echoprobe_reverb::{FieldAccess, SpatialReverb};

#[derive(Args)]
pub struct FieldsArgs {
    /// Show the access flag legend
    #[arg(long)]
    legend: bool,
}

pub fn run(args: FieldsArgs) -> anyhow::Result<()> {
    let info = SpatialReverb::info();

    println!("{}", info.name);
    println!("{}", "=".repeat(info.name.len()));
    println!();
    println!("{}", info.description);
    println!();
    println!(
        "Inputs: {}-{}, outputs: {}{}",
        info.min_inputs,
        info.max_inputs,
        info.outputs,
        if info.in_place { " (in-place)" } else { "" }
    );
    println!();

    println!(
        "  {:3}  {:20}  {:8}  {:5}  {:6}  {}",
        "Id", "Field", "Type", "Count", "Access", "Description"
    );
    println!(
        "  {:3}  {:20}  {:8}  {:5}  {:6}  {}",
        "--", "-----", "----", "-----", "------", "-----------"
    );
    for field in info.fields {
        println!(
            "  {:3}  {:20}  {:8}  {:5}  {:6}  {}",
            field.field.id(),
            field.field.name(),
            field.kind.name(),
            field.count,
            field.access.letters(),
            field.description
        );
    }

    if args.legend {
        println!();
        println!("Access flags:");
        for (flag, meaning) in [
            (FieldAccess::IN, "per input location"),
            (FieldAccess::OUT, "per output location"),
            (FieldAccess::SEGMENT, "whole segment"),
            (FieldAccess::SET, "writable"),
            (FieldAccess::GET, "readable"),
        ] {
            let letter = flag.letters().replace('-', "");
            println!("  {letter}  {meaning}");
        }
    }

    Ok(())
}
