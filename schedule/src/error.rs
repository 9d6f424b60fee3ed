use kiln_ir::BufferId;
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// An unrealized buffer has no operation to compute it from.
    #[snafu(display("{id} is not realized and has no producing operation"))]
    MissingOperation { id: BufferId },
}
