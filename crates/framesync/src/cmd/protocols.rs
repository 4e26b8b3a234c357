use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use framesync_codec::{LengthField, Protocol, ProtocolSpec};
use serde::Serialize;

use crate::cmd::ProtocolsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct ProtocolOutput {
    name: &'static str,
    description: &'static str,
    #[serde(flatten)]
    spec: ProtocolSpec,
}

pub fn run(args: ProtocolsArgs, format: OutputFormat) -> CliResult<i32> {
    if let Some(protocol) = args.spec {
        println!("{}", ProtocolSpec::from(&protocol.config()).to_json_pretty());
        return Ok(SUCCESS);
    }

    match format {
        OutputFormat::Json => {
            for protocol in Protocol::ALL {
                let out = ProtocolOutput {
                    name: protocol.name(),
                    description: protocol.description(),
                    spec: ProtocolSpec::from(&protocol.config()),
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["NAME", "TAG", "LENGTH", "CAPACITY", "DESCRIPTION"]);
            for protocol in Protocol::ALL {
                let config = protocol.config();
                let tags: Vec<String> = config
                    .tags()
                    .patterns()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                table.add_row(vec![
                    protocol.name().to_string(),
                    tags.join(" | "),
                    describe_length(config.length_field()),
                    config.max_value_capacity().to_string(),
                    protocol.description().to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for protocol in Protocol::ALL {
                println!("{:<14} {}", protocol.name(), protocol.description());
            }
        }
    }

    Ok(SUCCESS)
}

fn describe_length(length: LengthField) -> String {
    match length {
        LengthField::Prefixed { modifier: 0 } => "1-byte prefix".to_string(),
        LengthField::Prefixed { modifier } => format!("1-byte prefix ({modifier:+})"),
        LengthField::Fixed(size) => format!("fixed {size}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_descriptions() {
        assert_eq!(describe_length(LengthField::default()), "1-byte prefix");
        assert_eq!(
            describe_length(LengthField::Prefixed { modifier: 2 }),
            "1-byte prefix (+2)"
        );
        assert_eq!(describe_length(LengthField::Fixed(1)), "fixed 1");
    }
}
