//! Command handlers. Thin: each one drives the update machine and
//! prints the resulting state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use nvup_core::InstallAction;

use crate::bootstrap::CliContext;

/// `nvup check` - one check cycle.
pub async fn handle_check(ctx: &CliContext) -> Result<()> {
    let state = ctx.machine.check_now().await;
    println!("{}", state.short_summary());
    Ok(())
}

/// `nvup install` - check, then download and run the installer.
pub async fn handle_install(ctx: &CliContext) -> Result<()> {
    let state = ctx.machine.check_now().await;
    if !state.offers_install() {
        println!("{}", state.short_summary());
        return Ok(());
    }

    let action = ctx.machine.request_install().await;
    if action != InstallAction::Started {
        println!("{}", ctx.machine.current_state().await.short_summary());
        return Ok(());
    }

    // Ctrl-C toggles the active session, which cancels the download.
    let machine = Arc::clone(&ctx.machine);
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            machine.request_install().await;
        }
    });

    ctx.machine.wait_idle().await;
    signal.abort();

    println!("{}", ctx.machine.current_state().await.short_summary());
    Ok(())
}

/// `nvup watch` - periodic checks until interrupted.
pub async fn handle_watch(ctx: &CliContext, interval_minutes: u64) -> Result<()> {
    let interval = watch_interval(interval_minutes);
    loop {
        let state = ctx.machine.check_now().await;
        println!("{}", state.short_summary());

        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            () = tokio::time::sleep(interval) => {}
        }
    }
}

/// Clamp the watch interval to at least one minute, saturating on
/// absurd values instead of overflowing.
fn watch_interval(interval_minutes: u64) -> Duration {
    Duration::from_secs(interval_minutes.max(1).saturating_mul(60))
}
