use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("jennyio {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: jennyio");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("JENNYIO_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "endpoint: {} (protocol {})",
        jennyio_client::DEFAULT_PATH,
        jennyio_client::DEFAULT_PROTOCOL
    );
    println!(
        "features: client={}, tls={}, cli=true",
        cfg!(feature = "client"),
        cfg!(feature = "tls")
    );

    Ok(SUCCESS)
}
