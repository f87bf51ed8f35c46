use jennyio_client::{derive_endpoint, ClientConfig};
use serde::Serialize;

use crate::cmd::{parse_page_url, EndpointArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct EndpointOutput<'a> {
    page: &'a str,
    endpoint: &'a str,
    protocol: &'a str,
}

pub fn run(args: EndpointArgs, format: OutputFormat) -> CliResult<i32> {
    let page = parse_page_url(&args.page)?;
    let config = ClientConfig::default();
    let endpoint =
        derive_endpoint(&page, &config).map_err(|err| client_error("endpoint failed", err))?;

    match format {
        OutputFormat::Json => print_json(&EndpointOutput {
            page: page.as_str(),
            endpoint: endpoint.as_str(),
            protocol: &config.protocol,
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("endpoint: {endpoint}");
            println!("protocol: {}", config.protocol);
        }
        OutputFormat::Raw => println!("{endpoint}"),
    }
    Ok(SUCCESS)
}
