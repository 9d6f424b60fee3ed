/// Device a buffer lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(strum::AsRefStr, strum::Display)]
pub enum DeviceSpec {
    /// Host memory, kernels compiled by the system C toolchain.
    #[default]
    #[strum(serialize = "CPU")]
    Cpu,
}
