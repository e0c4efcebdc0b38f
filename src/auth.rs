//! Login, logout and account recovery commands.

use anyhow::Result;

use crate::completion::create_completer_or_disabled;
use crate::config::Config;

pub fn run_login(config: &Config, email: &str, password: &str) -> Result<()> {
    let mut app = crate::app::open(config)?;
    let user = app.login(email, password)?;
    println!("Logged in as {} ({}).", user.name, user.role);
    Ok(())
}

pub fn run_logout(config: &Config) -> Result<()> {
    let mut app = crate::app::open(config)?;
    app.logout()?;
    println!("Logged out.");
    Ok(())
}

pub async fn run_recover(config: &Config, email: &str) -> Result<()> {
    let app = crate::app::open(config)?;
    let completer = create_completer_or_disabled(&config.assistant);
    let notice = app.recover(email, completer.as_ref()).await?;

    println!("Recovery instructions sent to {}.", notice.email);
    println!();
    println!("{}", notice.message);
    Ok(())
}
