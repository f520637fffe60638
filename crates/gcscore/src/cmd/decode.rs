use std::io::{Cursor, Read};
use std::sync::Arc;

use gcscore::frame::{FrameConfig, FrameError, FrameReader};
use gcscore::vehicle::{MessageDispatcher, VehicleStateStore};
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_decode, DecodeCounters, DecodeReport, FrameSummary, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = read_input(&args)?;
    let bytes = if args.hex { parse_hex(&raw)? } else { raw };
    debug!(len = bytes.len(), "decoding capture");

    let config = FrameConfig {
        verify_checksum: !args.no_verify,
        forward_unknown: !args.drop_unknown,
    };
    let report = decode(bytes, config)?;
    print_decode(&report, format);
    Ok(SUCCESS)
}

fn decode(bytes: Vec<u8>, config: FrameConfig) -> CliResult<DecodeReport> {
    let dispatcher = MessageDispatcher::new(Arc::new(VehicleStateStore::new()));
    let mut reader = FrameReader::with_config(Cursor::new(bytes), config);
    let mut frames = Vec::new();

    loop {
        match reader.read_frame() {
            Ok(frame) => {
                dispatcher.dispatch(&frame);
                frames.push(FrameSummary::from(&frame));
            }
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("decode failed", err)),
        }
    }

    Ok(DecodeReport {
        frames,
        counters: DecodeCounters::new(reader.stats(), dispatcher.stats()),
        state: dispatcher.store().read(),
    })
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if args.input.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("failed reading stdin", err))?;
        return Ok(buf);
    }
    std::fs::read(&args.input)
        .map_err(|err| io_error(&format!("failed reading {}", args.input.display()), err))
}

fn parse_hex(raw: &[u8]) -> CliResult<Vec<u8>> {
    let text = std::str::from_utf8(raw)
        .map_err(|err| CliError::new(DATA_INVALID, format!("hex input is not UTF-8: {err}")))?;
    let digits: String = text
        .split_whitespace()
        .map(|token| token.trim_start_matches("0x"))
        .collect();
    hex::decode(&digits).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}

#[cfg(test)]
mod tests {
    use gcscore::frame::frame_checksum;

    use super::*;

    fn heartbeat() -> Vec<u8> {
        let mut bytes = vec![0xFE, 0x00, 0x01, 0x02, 0x03, 0x00];
        let crc = frame_checksum(&bytes[1..], 50);
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes
    }

    #[test]
    fn parse_hex_ignores_spacing_and_prefixes() {
        assert_eq!(parse_hex(b"fe 00\n0x01 02").unwrap(), vec![0xFE, 0x00, 0x01, 0x02]);
        assert!(parse_hex(b"fe0").is_err());
        assert!(parse_hex(b"zz").is_err());
    }

    #[test]
    fn decode_reports_frames_and_state() {
        let mut bytes = vec![0x55];
        bytes.extend(heartbeat());
        let report = decode(bytes, FrameConfig::default()).unwrap();

        assert_eq!(report.frames.len(), 1);
        assert_eq!(report.frames[0].message, "HEARTBEAT");
        assert_eq!(report.frames[0].verified, Some(true));
        assert!(report.state.connected);
        assert_eq!(report.state.system_id, 2);
        assert_eq!(report.counters.bytes_discarded, 1);
        assert_eq!(report.counters.applied, 1);
    }

    #[test]
    fn no_verify_accepts_bad_checksum() {
        let mut bytes = heartbeat();
        bytes[6] ^= 0xFF;

        let strict = decode(bytes.clone(), FrameConfig::default()).unwrap();
        assert!(strict.frames.is_empty());
        assert_eq!(strict.counters.checksum_failures, 1);

        let lenient = decode(
            bytes,
            FrameConfig {
                verify_checksum: false,
                ..FrameConfig::default()
            },
        )
        .unwrap();
        assert_eq!(lenient.frames.len(), 1);
        assert_eq!(lenient.frames[0].verified, Some(false));
    }
}
