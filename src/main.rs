//! baserate: inspect layered configuration and maintain cache namespaces

use anyhow::Result;

fn main() -> Result<()> {
    baserate::cli::run()
}
