use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use fitsdom::{DecodeOptions, Entry, FitsDataModel, NegativeBitpix};
use flexi_logger::Logger;

/// Print every entry of a FITS file: kind, header records and data size.
#[derive(Debug, Parser)]
#[command(name = "fitsdump", version)]
struct Args {
    /// FITS file to decode.
    file: PathBuf,

    /// Print only entry kinds and data sizes.
    #[arg(short, long)]
    summary: bool,

    /// Size negative-BITPIX data with |BITPIX| / 8 instead of failing.
    #[arg(long)]
    magnitude_bitpix: bool,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn decode_options(&self) -> DecodeOptions {
        let policy = if self.magnitude_bitpix {
            NegativeBitpix::Magnitude
        } else {
            NegativeBitpix::Reject
        };
        DecodeOptions::new().negative_bitpix(policy)
    }
}

fn format_entry(entry: &Entry, summary: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("FITS Entry: {}\n", entry.kind));
    if !summary {
        out.push_str("Header:\n");
        for param in &entry.header {
            match &param.comment {
                Some(comment) => {
                    out.push_str(&format!(
                        "{} = {} // {}\n",
                        param.name, param.raw_text, comment
                    ));
                }
                None => {
                    out.push_str(&format!("{} = {}\n", param.name, param.raw_text));
                }
            }
        }
    }
    out.push_str(&format!("Data: {} bytes\n", entry.data.len()));
    out
}

fn format_model(model: &FitsDataModel, summary: bool) -> String {
    let mut out = String::new();
    for (i, entry) in model.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format_entry(entry, summary));
    }
    out
}

fn run(args: &Args) -> anyhow::Result<String> {
    let data = std::fs::read(&args.file)
        .with_context(|| format!("Error reading '{}'", args.file.display()))?;

    let model = FitsDataModel::decode_with(&data, &args.decode_options())
        .with_context(|| format!("Error decoding '{}'", args.file.display()))?;
    if model.is_empty() {
        log::warn!(
            "'{}' holds no entries ({} bytes)",
            args.file.display(),
            data.len()
        );
    }

    Ok(format_model(&model, args.summary))
}

fn main() {
    let args = Args::parse();

    let _logger = match Logger::try_with_env_or_str(&args.log_level)
        .and_then(|logger| logger.log_to_stderr().start())
    {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("logger initialization failed: {e}");
            None
        }
    };

    match run(&args) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("{e:#}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use fitsdom::block::{padded_byte_len, BLOCK_SIZE, CARD_SIZE};

    fn block_of(cards: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        for c in cards {
            let mut card = [b' '; CARD_SIZE];
            card[..c.len()].copy_from_slice(c.as_bytes());
            buf.extend_from_slice(&card);
        }
        buf.resize(padded_byte_len(buf.len()), b' ');
        buf
    }

    fn args_for(path: PathBuf) -> Args {
        Args {
            file: path,
            summary: false,
            magnitude_bitpix: false,
            log_level: "warn".into(),
        }
    }

    fn sample_file() -> Vec<u8> {
        let mut buf = block_of(&[
            "SIMPLE  =                    T / conforms",
            "BITPIX  =                    8",
            "NAXIS   =                    1",
            "NAXIS1  =                    4",
            "END",
        ]);
        let mut data = vec![0u8; BLOCK_SIZE];
        data[..4].copy_from_slice(&[1, 2, 3, 4]);
        buf.extend(data);
        buf
    }

    #[test]
    fn dump_lists_header_and_size() {
        let model = FitsDataModel::decode(&sample_file()).unwrap();
        let out = format_model(&model, false);
        assert!(out.starts_with("FITS Entry: Primary\nHeader:\n"));
        assert!(out.contains("SIMPLE = T // conforms\n"));
        assert!(out.contains("BITPIX = 8\n"));
        assert!(out.contains("END = \n"));
        assert!(out.ends_with("Data: 2880 bytes\n"));
    }

    #[test]
    fn summary_skips_header() {
        let model = FitsDataModel::decode(&sample_file()).unwrap();
        let out = format_model(&model, true);
        assert_eq!(out, "FITS Entry: Primary\nData: 2880 bytes\n");
    }

    #[test]
    fn run_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&sample_file()).unwrap();
        let out = run(&args_for(file.path().to_path_buf())).unwrap();
        assert!(out.contains("NAXIS1 = 4\n"));
    }

    #[test]
    fn run_reports_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&block_of(&["SIMPLE  = T", "NAXIS   = 0", "END"]))
            .unwrap();
        let err = run(&args_for(file.path().to_path_buf())).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Error decoding"));
        assert!(msg.contains("BITPIX"));
    }

    #[test]
    fn run_missing_file() {
        let err = run(&args_for(PathBuf::from("/nonexistent/file.fits"))).unwrap_err();
        assert!(format!("{err}").contains("Error reading"));
    }

    #[test]
    fn magnitude_flag_selects_policy() {
        let mut args = args_for(PathBuf::from("x.fits"));
        assert_eq!(args.decode_options().negative_bitpix, NegativeBitpix::Reject);
        args.magnitude_bitpix = true;
        assert_eq!(
            args.decode_options().negative_bitpix,
            NegativeBitpix::Magnitude
        );
    }

    #[test]
    fn cli_parses_flags() {
        let args = Args::try_parse_from(["fitsdump", "--summary", "--magnitude-bitpix", "a.fits"])
            .unwrap();
        assert!(args.summary);
        assert!(args.magnitude_bitpix);
        assert_eq!(args.file, PathBuf::from("a.fits"));
        assert_eq!(args.log_level, "warn");
    }
}
