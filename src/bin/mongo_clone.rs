use clap::Parser;
use mongo_clone::{MongoSyncer, ServerConf, SyncJob, SyncerConfig};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(version = env!("CARGO_PKG_VERSION"), author = env!("CARGO_PKG_AUTHORS"))]
struct Opts {
    /// configuration file path, when it's given, other sync options are ignored.
    #[clap(short, long)]
    conf: Option<String>,
    /// source database uri.
    #[clap(short, long, required_unless_present = "conf")]
    src_uri: Option<String>,
    /// target database uri.
    #[clap(short = 't', long, required_unless_present = "conf")]
    dst_uri: Option<String>,
    /// database to sync.
    #[clap(short, long, required_unless_present = "conf")]
    db: Option<String>,
    /// database name in target, default to the same as `db`.
    #[clap(long)]
    dst_db: Option<String>,
    /// collections to sync, separated by comma, default to all collections.
    #[clap(long, value_delimiter = ',')]
    colls: Option<Vec<String>>,
    /// maximum documents of one bulk insert.
    #[clap(long)]
    batch_size: Option<usize>,
    /// log file path, if not specified, all log information will be output to stdout.
    #[clap(long)]
    log_path: Option<String>,
}

impl Opts {
    fn into_job(self) -> Result<SyncJob, Box<dyn std::error::Error>> {
        if let Some(conf) = self.conf {
            return Ok(SyncerConfig::from_path(conf)?.into_job());
        }

        let (src_uri, dst_uri, db) = match (self.src_uri, self.dst_uri, self.db) {
            (Some(src_uri), Some(dst_uri), Some(db)) => (src_uri, dst_uri, db),
            _ => return Err("src-uri, dst-uri and db are required without conf".into()),
        };
        let mut job = SyncJob::new(ServerConf::new(src_uri), ServerConf::new(dst_uri), db);
        if let Some(dst_db) = self.dst_db {
            job = job.with_dst_db(dst_db);
        }
        if let Some(colls) = self.colls {
            job = job.with_colls(colls);
        }
        if let Some(batch_size) = self.batch_size {
            job = job.with_batch_size(batch_size);
        }
        Ok(job)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts: Opts = Opts::parse();
    let collector = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    let (non_blocking, guard) = match &opts.log_path {
        Some(path) => {
            let path = Path::new(path);
            let dir_name = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir,
                _ => Path::new("."),
            };
            let file_name = path.file_name().ok_or("log path should be a file")?;
            let file_appender = tracing_appender::rolling::daily(dir_name, file_name);
            tracing_appender::non_blocking(file_appender)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };
    collector.with_writer(non_blocking).init();

    let job = opts.into_job()?;
    info!(
        db = job.get_db(),
        dst_db = job.get_dst_db(),
        colls = ?job.get_colls(),
        batch_size = job.get_batch_size(),
        "Use the following config to sync database"
    );

    if let Err(e) = MongoSyncer::new(job).sync() {
        let mut source = std::error::Error::source(&e);
        error!(%e, "Sync failed");
        while let Some(cause) = source {
            error!(%cause, "Caused by");
            source = cause.source();
        }
        // flush pending logs, exit doesn't run destructors.
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use uuid::Uuid;

    #[test]
    fn test_flags_into_job() {
        let opts = Opts::try_parse_from([
            "mongo_clone",
            "-s",
            "mongodb://a",
            "-t",
            "mongodb://b",
            "-d",
            "app",
            "--dst-db",
            "app_copy",
            "--colls",
            "users,orders",
            "--batch-size",
            "10",
        ])
        .unwrap();
        let job = opts.into_job().unwrap();

        assert_eq!(job.get_src(), &ServerConf::new("mongodb://a"));
        assert_eq!(job.get_dst(), &ServerConf::new("mongodb://b"));
        assert_eq!(job.get_db(), "app");
        assert_eq!(job.get_dst_db(), "app_copy");
        assert_eq!(
            job.get_colls(),
            Some(&["users".to_string(), "orders".to_string()][..])
        );
        assert_eq!(job.get_batch_size(), 10);
    }

    #[test]
    fn test_conf_overrides_flags() {
        let path = std::env::temp_dir().join(format!("mongo_clone_{}.toml", Uuid::new_v4()));
        fs::write(
            &path,
            r#"
[src]
url = "mongodb://conf_src"
[dst]
url = "mongodb://conf_dst"
[sync]
db = "from_conf"
"#,
        )
        .unwrap();
        let opts = Opts::try_parse_from([
            "mongo_clone",
            "--conf",
            path.to_str().unwrap(),
            "-d",
            "from_flag",
            "--colls",
            "a",
        ])
        .unwrap();
        let job = opts.into_job();
        fs::remove_file(&path).unwrap();

        let job = job.unwrap();
        assert_eq!(job.get_src(), &ServerConf::new("mongodb://conf_src"));
        assert_eq!(job.get_db(), "from_conf");
        assert_eq!(job.get_colls(), None);
    }

    #[test]
    fn test_flags_required_without_conf() {
        assert!(Opts::try_parse_from(["mongo_clone", "-s", "mongodb://a", "-d", "app"]).is_err());
        assert!(Opts::try_parse_from(["mongo_clone"]).is_err());
        assert!(Opts::try_parse_from(["mongo_clone", "-c", "config.toml"]).is_ok());
    }

    #[test]
    fn test_missing_conf_file() {
        let opts = Opts::try_parse_from(["mongo_clone", "-c", "/nonexistent/mongo_clone.toml"])
            .unwrap();
        assert!(opts.into_job().is_err());
    }
}
