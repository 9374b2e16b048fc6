use clap::Parser;
use std::{
    fmt::Display,
    net::SocketAddr,
    str::FromStr,
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Address the dashboard is served on
    #[clap(short, long, env, default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Repository API URL
    #[clap(long, env, default_value = "https://api.github.com")]
    pub api_url: String,

    /// User-Agent sent to the repository API
    #[clap(long, env, default_value = "repo-insight")]
    pub user_agent: String,

    /// Repository API request timeout in seconds
    #[clap(long, env, parse(try_from_str=request_timeout_in_range))]
    pub request_timeout: Option<u64>,

    /// Maximal number of commit pages read by one frequency query (unbounded when unset)
    #[clap(long, env, parse(try_from_str=max_commit_pages_in_range))]
    pub max_commit_pages: Option<u32>,
}

fn request_timeout_in_range(value: &str) -> clap::Result<u64, String> {
    number_in_range(value, 1, u64::MAX, "request_timeout".to_string())
}

fn max_commit_pages_in_range(value: &str) -> clap::Result<u32, String> {
    number_in_range(value, 1, u32::MAX, "max_commit_pages".to_string())
}

fn number_in_range<T>(value: &str, min: T, max: T, name: String) -> clap::Result<T, String>
where
    T: FromStr + PartialOrd + Display,
    <T as FromStr>::Err: Display,
{
    value.parse::<T>().map_err(|err| format!("{}", err)).and_then(|value| {
        if value < min || value > max {
            return Err(format!("{} is not in range {} .. {}.", name, min, max));
        }
        Ok(value)
    })
}
