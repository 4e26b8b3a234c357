use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("framesync {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: framesync");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("FRAMESYNC_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "features: async={}, cli=true",
        cfg!(feature = "async")
    );
    println!(
        "default_chunk_size: {}",
        framesync_codec::DEFAULT_CHUNK_SIZE
    );

    Ok(SUCCESS)
}
