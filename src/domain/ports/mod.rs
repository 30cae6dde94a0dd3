mod connectivity_check;
mod sleeper;

pub use connectivity_check::ConnectivityCheck;
pub use sleeper::Sleeper;
