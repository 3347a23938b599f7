//! Turns the outcome of a deployment into operator output and an exit status.

use std::{io::Write, process::ExitCode};

use eyre::Result;

use crate::driver::Deployment;

/// The terminal state of a deployer run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployStatus {
    Deployed,
    Failed,
}

impl DeployStatus {
    /// The process exit code for this status.
    pub fn code(self) -> u8 {
        match self {
            DeployStatus::Deployed => 0,
            DeployStatus::Failed => 1,
        }
    }
}

impl From<DeployStatus> for ExitCode {
    fn from(status: DeployStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Writes the deployed address to `stdout`, or the full error chain to
/// `stderr`. A deployment whose address can't be written out is reported as
/// failed since the caller never learns where the contract lives.
pub fn report(
    result: &Result<Deployment>,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> DeployStatus {
    match result {
        Ok(deployment) => match writeln!(
            stdout,
            "{} contract deployed to: {:#x}",
            deployment.contract, deployment.address
        ) {
            Ok(()) => DeployStatus::Deployed,
            Err(err) => {
                let _ = writeln!(
                    stderr,
                    "{} was deployed to {:#x} but reporting it failed: {}",
                    deployment.contract, deployment.address, err
                );
                DeployStatus::Failed
            }
        },
        Err(err) => {
            let _ = writeln!(stderr, "{err:?}");
            DeployStatus::Failed
        }
    }
}
