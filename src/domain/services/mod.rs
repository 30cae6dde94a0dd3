mod readiness_prober;

pub use readiness_prober::{
    ProbeError, ProberConfig, ProberState, ReadinessProber, ReadinessReport,
};
