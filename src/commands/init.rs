//! Interactive configuration setup.

use crate::{
    libs::{config::Config, messages::Message},
    msg_success,
};
use anyhow::Result;

/// Runs the setup wizard and saves the result.
pub fn cmd() -> Result<()> {
    Config::init()?.save()?;
    msg_success!(Message::ConfigSaved);
    Ok(())
}
