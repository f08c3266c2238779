use std::ops::Deref;

use clap::{Parser, Subcommand};
use pyslot_rt::rt::{RuntimeOptions, WarningAction};

#[derive(Debug)]
pub struct VerifiedCliOptions(pub(crate) CliOptions);

impl Deref for VerifiedCliOptions {
    type Target = CliOptions;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl VerifiedCliOptions {
    /// The runtime configuration these options describe.
    pub fn runtime_options(&self) -> RuntimeOptions {
        let defaults = RuntimeOptions::default();

        RuntimeOptions {
            warnings: if self.no_warnings {
                WarningAction::Ignore
            } else {
                WarningAction::Emit
            },
            small_ints: self.small_int_min.unwrap_or(*defaults.small_ints.start())
                ..=self.small_int_max.unwrap_or(*defaults.small_ints.end()),
        }
    }
}

#[derive(Debug, Parser, Clone)]
#[command(name = "pyslot", version, about = "Inspect the pyslot type registry")]
pub struct CliOptions {
    /// Drop warnings instead of printing them.
    #[arg(long, global = true)]
    pub no_warnings: bool,

    /// Lower bound of the shared small integer cache.
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub small_int_min: Option<i64>,

    /// Upper bound of the shared small integer cache.
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub small_int_max: Option<i64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the builtin type hierarchy.
    Tree {
        /// Only print the subtree under this type.
        #[arg(long)]
        root: Option<String>,
    },

    /// Show how every slot of a type was resolved.
    Slots {
        /// The type's name, for instance `bool` or `KeyError`.
        name: String,
    },
}

impl CliOptions {
    pub fn verify(self) -> Result<VerifiedCliOptions, String> {
        if let (Some(lo), Some(hi)) = (self.small_int_min, self.small_int_max) {
            if lo > hi {
                return Err(format!(
                    "--small-int-min ({}) is greater than --small-int-max ({})",
                    lo, hi
                ));
            }
        }

        if let Command::Slots { name } = &self.command {
            if name.is_empty() {
                return Err("type name must not be empty".into());
            }
        }

        Ok(VerifiedCliOptions(self))
    }
}
