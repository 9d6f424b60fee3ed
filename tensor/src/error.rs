use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("graph operation failed: {source}"))]
    Ir { source: kiln_ir::Error },

    #[snafu(display("scheduling failed: {source}"))]
    Schedule { source: kiln_schedule::Error },

    #[snafu(display("execution failed: {source}"))]
    Runtime { source: kiln_runtime::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
