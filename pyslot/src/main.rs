use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pyslot_core::{BuiltinType, Slot};
use pyslot_rt::{object::SlotState, Runtime};

mod opts;

use opts::{CliOptions, Command, VerifiedCliOptions};

fn tree(rt: &Runtime, root: Option<&str>) -> anyhow::Result<()> {
    let types = rt.types();
    let tree = types.tree()?;

    tree.verify()?;

    let roots = match root {
        Some(name) => vec![types
            .by_name(name)
            .ok_or_else(|| anyhow!("no type named {:?}", name))?
            .id()],
        None => vec![
            BuiltinType::Object.type_id(),
            BuiltinType::BaseException.type_id(),
        ],
    };

    for root in roots {
        tracing::debug!("[main::tree] rendering from {}", root);
        print!("{}", tree.render(root)?);
    }

    Ok(())
}

fn slots(rt: &Runtime, name: &str) -> anyhow::Result<()> {
    let types = rt.types();
    let ty = types
        .by_name(name)
        .ok_or_else(|| anyhow!("no type named {:?}", name))?;

    let base = ty
        .base()
        .map(|b| types.lookup(b).name().to_owned())
        .unwrap_or_else(|| "-".into());

    println!("{} (base: {}, mro: {})", ty.name(), base, ty.mro().len());

    for slot in Slot::ALL.iter().copied() {
        let state = match ty.slot_state(slot) {
            SlotState::Declared(_) => "declared".to_owned(),
            SlotState::Inherited { from, .. } => {
                format!("inherited from {}", types.lookup(*from).name())
            }
            SlotState::Blocked => "blocked".to_owned(),
            SlotState::Unfilled => "unfilled".to_owned(),
        };

        println!(
            "  {:<16} {:<14} {:<10} {}",
            slot.slot_name(),
            slot.method_name(),
            slot.signature().shape(),
            state
        );
    }

    Ok(())
}

fn run(opts: VerifiedCliOptions) -> anyhow::Result<()> {
    let rt = Runtime::new(opts.runtime_options()).context("failed to start the runtime")?;

    tracing::trace!("[main::run] {} types registered", rt.types().len());

    match &opts.command {
        Command::Tree { root } => tree(&rt, root.as_deref()),
        Command::Slots { name } => slots(&rt, name),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = CliOptions::parse().verify().map_err(|err| anyhow!(err))?;

    run(opts)
}
