//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - bollard over the control socket for the container runtime (ContainerSource)
//! - `docker ps` through a CommandRunner (ContainerSource)
//! - std::process with a deadline (CommandRunner)
//! - reqwest blocking client for the host-side Backup API (BackupApi)
//! - tar + gzip for synthesized backup archives

pub mod archive;
pub mod backup_api;
pub mod docker_cli;
pub mod docker_socket;
pub mod process;

pub use backup_api::HttpBackupApi;
pub use docker_cli::DockerCliSource;
pub use docker_socket::DockerSocketSource;
pub use process::SystemCommandRunner;
