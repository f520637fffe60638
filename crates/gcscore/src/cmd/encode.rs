use gcscore::frame::{FrameWriter, COMMAND_LONG};
use gcscore::vehicle::{command_long_payload, CommandRequest, GCS_COMPONENT_ID, GCS_SYSTEM_ID};

use crate::cmd::{CommandKind, EncodeArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_encode, EncodeReport, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let request = request_for(args.command, args.altitude)?;
    let payload = command_long_payload(&request, args.target_system, args.target_component);

    let mut writer = FrameWriter::new(Vec::new(), GCS_SYSTEM_ID, GCS_COMPONENT_ID);
    let header = writer
        .send(COMMAND_LONG, &payload)
        .map_err(|err| frame_error("encode failed", err))?;
    let bytes = writer.into_inner();

    if let Some(path) = &args.out {
        std::fs::write(path, &bytes)
            .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
    }

    let report = EncodeReport {
        command: format!("{:?}", args.command).to_lowercase(),
        command_id: request.command_id(),
        target_system: args.target_system,
        target_component: args.target_component,
        sequence: header.sequence,
        len: bytes.len(),
        hex: hex::encode(&bytes),
    };
    print_encode(&report, format);
    Ok(SUCCESS)
}

fn request_for(kind: CommandKind, altitude: f32) -> CliResult<CommandRequest> {
    Ok(match kind {
        CommandKind::Arm => CommandRequest::ArmDisarm(true),
        CommandKind::Disarm => CommandRequest::ArmDisarm(false),
        CommandKind::Rtl => CommandRequest::ReturnToLaunch,
        CommandKind::Takeoff => {
            if !altitude.is_finite() {
                return Err(CliError::new(USAGE, "--altitude must be a finite number"));
            }
            CommandRequest::Takeoff(altitude)
        }
    })
}
