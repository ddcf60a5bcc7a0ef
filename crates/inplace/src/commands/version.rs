//! Version command

use crate::cli::VersionArgs;
use crate::version::VersionInfo;
use anyhow::Result;
use inplace_core::HierarchicalConfigLoader;

pub fn run(args: VersionArgs) -> Result<()> {
    let config = HierarchicalConfigLoader::new()?.load_runtime_config()?;
    let info = VersionInfo::current(&config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info);
        println!("Updates:    github.com/{} ({:?})", info.repository, info.strategy);
        println!("Token from: {}", info.token_env);
    }

    Ok(())
}
