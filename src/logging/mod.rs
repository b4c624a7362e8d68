use std::{env, io::Write as _, os::fd::AsFd as _, time::SystemTime};

use anstyle::{AnsiColor, Effects};
use env_logger::Env;
use log::Level;

/// Device and inode of a `$JOURNAL_STREAM` value, see `systemd.exec(5)`.
fn journal_stream(value: &str) -> Option<(u64, u64)> {
    let (device, inode) = value.split_once(':')?;
    Some((device.parse().ok()?, inode.parse().ok()?))
}

/// Whether stderr is the stream systemd connected to the journal for this service.
fn stderr_is_journal() -> bool {
    let Some(stream) = env::var_os("JOURNAL_STREAM") else {
        return false;
    };
    let Some(expected) = stream.to_str().and_then(journal_stream) else {
        return false;
    };

    rustix::fs::fstat(std::io::stderr().as_fd())
        .is_ok_and(|stat| (stat.st_dev, stat.st_ino) == expected)
}

fn journal_priority(level: Level) -> u8 {
    match level {
        Level::Error => 3,
        Level::Warn => 4,
        Level::Info => 6,
        Level::Debug | Level::Trace => 7,
    }
}

/// Sets up `RUST_LOG` controlled logging to stderr, prefixing records with the migrated user.
pub fn init(user: Option<&str>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    let user = user.map(|user| format!("{user} ")).unwrap_or_default();
    if stderr_is_journal() {
        builder.format(move |buf, record| {
            writeln!(
                buf,
                "<{}>{user}{}: {}",
                journal_priority(record.level()),
                record.target(),
                record.args()
            )
        });
    } else {
        let subtle = AnsiColor::BrightBlack.on_default();
        builder.format(move |buf, record| {
            write!(buf, "{subtle}[{subtle:#}")?;
            match jiff::Timestamp::try_from(SystemTime::now()) {
                Ok(now) => write!(buf, "{now:.3} ")?,
                Err(_) => write!(buf, "timestamp_error ")?,
            }
            let level_style = match record.level() {
                Level::Error => AnsiColor::Red.on_default().effects(Effects::BOLD),
                Level::Warn => AnsiColor::Yellow.on_default(),
                Level::Info => AnsiColor::Green.on_default(),
                Level::Debug => AnsiColor::Blue.on_default(),
                Level::Trace => AnsiColor::Cyan.on_default(),
            };
            write!(
                buf,
                "{level_style}{}{level_style:#} {user}{}",
                record.level(),
                record.target(),
            )?;
            if let Some(line) = record.line() {
                write!(buf, ":{line}")?;
            }
            writeln!(buf, "{subtle}]{subtle:#} {}", record.args())
        });
    }
    builder.init();
}
