use std::{fmt::Display, path::PathBuf};

use derive_builder::Builder;
use derive_getters::Getters;

use crate::config::Config;

const SOURCE_AUTH_MECHANISM: &str = "PLAIN";
const DESTINATION_AUTH_MECHANISM: &str = "XOAUTH";

/// Maps the well known special folders onto their Gmail counterparts.
const FOLDER_RENAMES: [&str; 3] = [
    r"s/^drafts$/[Gmail]\/Drafts/i",
    r"s/^trash$/[Gmail]\/Trash/i",
    r"s/^(sent|sent-mail)$/[Gmail]\/Sent Mail/i",
];
const PROTECTED_FOLDERS: &str = r"^\[Gmail\]";

/// Collapses and strips the whitespace the destination refuses in folder names.
const WHITESPACE_CLEANUP: [&str; 5] = [
    r"s/[ ]+/ /g",
    r"s/\s+$//g",
    r"s/\s+(?=\/)//g",
    r"s/^\s+//g",
    r"s/(?<=\/)\s+//g",
];

/// A fully resolved invocation of the external synchronization executable for one user.
///
/// The command is only rendered here. Running it is left to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Getters)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SyncCommand {
    #[getter(rename = "program")]
    executable: PathBuf,
    user: String,
    pid_dir: PathBuf,
    source_host: String,
    source_port: u16,
    source_admin: String,
    source_pass_file: PathBuf,
    source_separator: char,
    destination_host: String,
    destination_port: u16,
    destination_user: String,
    destination_pass_file: PathBuf,
    max_message_size: u64,
    #[builder(default)]
    exclude: Vec<String>,
    #[builder(default = "true")]
    dry_run: bool,
}

impl SyncCommandBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.user {
            Some(user) if user.is_empty() => Err("user should not be empty".to_string()),
            Some(user) if user.contains(char::is_whitespace) || user.contains('/') => {
                Err(format!("user {user:?} should be a plain login name"))
            }
            _ => Ok(()),
        }
    }
}

impl SyncCommand {
    pub fn for_user(config: &Config, user: &str) -> Result<Self, SyncCommandBuilderError> {
        let source = config.source();
        let destination = config.destination();
        let sync = config.sync();

        SyncCommandBuilder::default()
            .executable(sync.executable().clone())
            .user(user)
            .pid_dir(sync.pid_dir().clone())
            .source_host(source.host().as_str())
            .source_port(source.port())
            .source_admin(source.admin_user().as_str())
            .source_pass_file(source.pass_file().clone())
            .source_separator(source.separator())
            .destination_host(destination.host().as_str())
            .destination_port(destination.port())
            .destination_user(destination.address_of(user))
            .destination_pass_file(destination.pass_file().clone())
            .max_message_size(sync.max_message_size())
            .exclude(sync.exclude().clone())
            .dry_run(sync.dry_run())
            .build()
    }

    pub fn pid_file(&self) -> PathBuf {
        self.pid_dir.join(format!("imapsync-{}.pid", self.user))
    }

    /// Arguments in the order the executable documents them, without the program itself.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--pidfile".to_string(),
            self.pid_file().display().to_string(),
            "--host1".to_string(),
            self.source_host.clone(),
            "--port1".to_string(),
            self.source_port.to_string(),
            "--user1".to_string(),
            self.user.clone(),
            "--authuser1".to_string(),
            self.source_admin.clone(),
            "--passfile1".to_string(),
            self.source_pass_file.display().to_string(),
            "--host2".to_string(),
            self.destination_host.clone(),
            "--port2".to_string(),
            self.destination_port.to_string(),
            "--user2".to_string(),
            self.destination_user.clone(),
            "--passfile2".to_string(),
            self.destination_pass_file.display().to_string(),
            "--ssl1".to_string(),
            "--ssl2".to_string(),
            "--maxsize".to_string(),
            self.max_message_size.to_string(),
            "--authmech1".to_string(),
            SOURCE_AUTH_MECHANISM.to_string(),
            "--authmech2".to_string(),
            DESTINATION_AUTH_MECHANISM.to_string(),
            "--sep1".to_string(),
            self.source_separator.to_string(),
        ];
        if !self.exclude.is_empty() {
            args.push("--exclude".to_string());
            args.push(self.exclude.join("|"));
        }
        for rename in FOLDER_RENAMES {
            args.push("--regextrans2".to_string());
            args.push(rename.to_string());
        }
        args.push("--delete2foldersbutnot".to_string());
        args.push(PROTECTED_FOLDERS.to_string());
        for cleanup in WHITESPACE_CLEANUP {
            args.push("--regextrans2".to_string());
            args.push(cleanup.to_string());
        }
        args.extend(
            ["--delete2", "--delete2folders", "--fast"]
                .into_iter()
                .map(String::from),
        );
        if self.dry_run {
            args.push("--dry".to_string());
        }

        args
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c)
}

fn shell_quoted(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(is_shell_safe) {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

impl Display for SyncCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", shell_quoted(&self.executable.display().to_string()))?;
        for arg in self.args() {
            write!(f, " {}", shell_quoted(&arg))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use assertables::*;
    use rstest::*;

    use super::*;

    #[fixture]
    fn config() -> Config {
        assert_ok!(Config::from_toml(
            r#"
[source]
host = "cyrus.example.edu"
admin_user = "cyradm"
pass_file = "/opt/migrate/cyrus.pf"

[destination]
host = "imap.gmail.com"
domain = "gtest.example.edu"
pass_file = "/opt/migrate/google-test.pf"

[sync]
executable = "/opt/migrate/imapsync"
pid_dir = "/tmp"
"#
        ))
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|arg| arg == flag)
            .and_then(|index| args.get(index + 1))
            .map(String::as_str)
    }

    #[rstest]
    fn test_for_user_addresses_both_servers(config: Config) {
        let command = assert_ok!(SyncCommand::for_user(&config, "jdoe"));
        let args = command.args();

        assert_eq!(Path::new("/opt/migrate/imapsync"), command.program());
        assert_eq!(Some("/tmp/imapsync-jdoe.pid"), value_after(&args, "--pidfile"));
        assert_eq!(Some("cyrus.example.edu"), value_after(&args, "--host1"));
        assert_eq!(Some("993"), value_after(&args, "--port1"));
        assert_eq!(Some("jdoe"), value_after(&args, "--user1"));
        assert_eq!(Some("cyradm"), value_after(&args, "--authuser1"));
        assert_eq!(Some("imap.gmail.com"), value_after(&args, "--host2"));
        assert_eq!(Some("jdoe@gtest.example.edu"), value_after(&args, "--user2"));
        assert_eq!(Some("26214400"), value_after(&args, "--maxsize"));
        assert_eq!(Some("/"), value_after(&args, "--sep1"));
        assert_eq!(
            Some("^Shared Folders|^mail/|^Junk$|^junk$|^JUNK$|^Spam$|^spam$|^SPAM$"),
            value_after(&args, "--exclude")
        );
    }

    #[rstest]
    fn test_args_end_with_dry_run_by_default(config: Config) {
        let command = assert_ok!(SyncCommand::for_user(&config, "jdoe"));
        let args = command.args();

        assert!(command.dry_run());
        assert_ends_with!(
            args.as_slice(),
            ["--delete2", "--delete2folders", "--fast", "--dry"].map(String::from).as_slice()
        );
        assert_eq!(
            8,
            args.iter().filter(|arg| *arg == "--regextrans2").count()
        );
    }

    #[rstest]
    fn test_args_omit_dry_run_and_empty_exclude() {
        let command = assert_ok!(
            SyncCommandBuilder::default()
                .executable("imapsync")
                .user("jdoe")
                .pid_dir("/run")
                .source_host("a")
                .source_port(993_u16)
                .source_admin("admin")
                .source_pass_file("a.pf")
                .source_separator('.')
                .destination_host("b")
                .destination_port(993_u16)
                .destination_user("jdoe@b")
                .destination_pass_file("b.pf")
                .max_message_size(1_u64)
                .dry_run(false)
                .build()
        );
        let args = command.args();

        assert_not_contains!(args, &"--dry".to_string());
        assert_not_contains!(args, &"--exclude".to_string());
        assert_eq!(Some("."), value_after(&args, "--sep1"));
    }

    #[rstest]
    #[case("")]
    #[case("j doe")]
    #[case("../jdoe")]
    fn test_for_user_rejects_unusable_user(config: Config, #[case] user: &str) {
        assert_err!(SyncCommand::for_user(&config, user));
    }

    #[rstest]
    fn test_display_quotes_shell_metacharacters(config: Config) {
        let command = assert_ok!(SyncCommand::for_user(&config, "jdoe"));
        let rendered = command.to_string();

        assert_starts_with!(
            rendered,
            "/opt/migrate/imapsync --pidfile /tmp/imapsync-jdoe.pid --host1 cyrus.example.edu"
        );
        assert_contains!(
            rendered,
            "--exclude '^Shared Folders|^mail/|^Junk$|^junk$|^JUNK$|^Spam$|^spam$|^SPAM$'"
        );
        assert_contains!(rendered, r"--delete2foldersbutnot '^\[Gmail\]'");
        assert_ends_with!(rendered, "--fast --dry");
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("", "''")]
    #[case("it's", r"'it'\''s'")]
    #[case("a b", "'a b'")]
    fn test_shell_quoted(#[case] arg: &str, #[case] expected: &str) {
        assert_eq!(expected, shell_quoted(arg));
    }
}
