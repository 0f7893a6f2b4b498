#![doc = include_str!("../README.md")]

mod installer;
mod probe;

pub use installer::ElevatedInstallerLauncher;
pub use probe::SystemDriverProbe;
