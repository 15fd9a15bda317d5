//! Device command handlers.

use devreg_core::Device;

use crate::cli::{DeviceArgs, DeviceCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

fn list(values: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let joined = values
        .into_iter()
        .map(|v| v.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() { "-".into() } else { joined }
}

fn detail(device: &Device) -> String {
    let enabled = match device.enabled() {
        Some(true) => "yes",
        Some(false) => "no",
        None => "yes (default)",
    };
    [
        format!("Enabled:     {enabled}"),
        format!("Via:         {}", list(device.via())),
        format!("Via Groups:  {}", list(device.via_groups())),
        format!("Member Of:   {}", list(device.member_of())),
        format!("Mapper:      {}", device.mapper().unwrap_or("-")),
        format!("Authorities: {}", list(device.authorities())),
        format!("Extensions:  {}", list(device.extensions().keys())),
    ]
    .join("\n")
}

pub fn handle(args: &DeviceArgs, global: &GlobalOpts, config: &Config) -> Result<(), CliError> {
    match &args.command {
        DeviceCommand::Validate { file } => {
            let body = util::read_payload(file, config.endpoint.max_payload_size)?;
            let device: Device =
                serde_json::from_slice(&body).map_err(|e| util::invalid(file, &e))?;

            let format = config::output_format(global, config);
            let out = output::render_single(format, &device, detail)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn detail_lists_relationships() {
        let mut device = Device::new();
        device.set_via(["gw-1", "gw-2"]).unwrap().set_mapper("lora");

        let out = detail(&device);
        assert!(out.contains("Enabled:     yes (default)"));
        assert!(out.contains("Via:         gw-1, gw-2"));
        assert!(out.contains("Member Of:   -"));
        assert!(out.contains("Mapper:      lora"));
    }
}
