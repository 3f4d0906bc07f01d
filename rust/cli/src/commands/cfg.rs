//! Configuration command handler.
//!
//! Prints the resolved configuration as pretty JSON, each value paired with
//! where it came from:
//!
//! ```json
//! {
//!   "zero_stack_policy": {
//!     "value": "keep",
//!     "source": "default"
//!   },
//!   ...
//! }
//! ```

use crate::config::ConfigResolved;
use crate::error::CliError;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write) -> Result<(), CliError> {
    let ConfigResolved { config, sources } = super::load_config()?;
    let display = serde_json::json!({
        "zero_stack_policy": {
            "value": config.zero_stack_policy,
            "source": sources.zero_stack_policy,
        },
        "ante_order": {
            "value": config.ante_order,
            "source": sources.ante_order,
        },
        "hand_log": {
            "value": config.hand_log,
            "source": sources.hand_log,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
