use arpscout_runtime::capture::DEFAULT_SNAPLEN;
use clap::{App, Arg, ArgMatches};
use std::ffi::OsString;
use std::path::PathBuf;

/// Where frames come from.
#[derive(Debug, PartialEq, Eq)]
pub enum Source {
    Live(String),
    Savefile(PathBuf),
    ListInterfaces,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Options {
    pub source: Source,
    pub snaplen: i32,
    pub promisc: bool,
    pub output: Option<PathBuf>,
    pub dedup: bool,
    pub queue: Option<usize>,
    pub max_sink_failures: Option<u32>,
    pub verbosity: u64,
}

fn app() -> App<'static, 'static> {
    App::new("arpscout")
        .version("0.1.0")
        .about("Passively listens for ARP replies and reports the devices that send them")
        .arg(
            Arg::with_name("interface")
                .value_name("INTERFACE")
                .help("Network interface to listen on")
                .required_unless_one(&["read", "list-interfaces"])
                .index(1),
        )
        .arg(
            Arg::with_name("read")
                .short("r")
                .long("read")
                .value_name("PCAP_FILE")
                .help("Replay a pcap savefile instead of listening on an interface")
                .takes_value(true)
                .conflicts_with("interface"),
        )
        .arg(
            Arg::with_name("list-interfaces")
                .short("L")
                .long("list-interfaces")
                .help("Print the interfaces available for capture and exit")
                .conflicts_with_all(&["interface", "read"]),
        )
        .arg(
            Arg::with_name("snaplen")
                .short("s")
                .long("snaplen")
                .value_name("BYTES")
                .help("Maximum bytes captured per frame")
                .takes_value(true)
                .validator(positive::<i32>),
        )
        .arg(
            Arg::with_name("no-promisc")
                .long("no-promisc")
                .help("Do not put the interface into promiscuous mode"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("OUTPUT_FILE")
                .help("Append discovery events to this file as JSON lines (default: stdout)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("dedup")
                .long("dedup")
                .help("Report each (IP, MAC) pair only once per run"),
        )
        .arg(
            Arg::with_name("queue")
                .short("q")
                .long("queue")
                .value_name("CAPACITY")
                .help("Hand events to the sink through a queue of this size on a worker thread")
                .takes_value(true)
                .validator(positive::<usize>),
        )
        .arg(
            Arg::with_name("max-sink-failures")
                .long("max-sink-failures")
                .value_name("COUNT")
                .help("Stop after this many consecutive sink failures (default: never stop)")
                .takes_value(true)
                .validator(positive::<u32>),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Log every ARP packet (-v) or everything (-vv)"),
        )
}

fn positive<T>(value: String) -> Result<(), String>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(n) if n > T::default() => Ok(()),
        _ => Err(format!("expected a positive number, got '{}'", value)),
    }
}

fn parsed_arg<T: std::str::FromStr>(arg_matches: &ArgMatches, name: &str) -> Option<T> {
    // validators already ran, so parsing cannot fail here
    arg_matches.value_of(name).and_then(|v| v.parse().ok())
}

pub fn parse<I, T>(args: I) -> Result<Options, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = app().get_matches_from_safe(args)?;

    let source = if matches.is_present("list-interfaces") {
        Source::ListInterfaces
    } else if let Some(path) = matches.value_of("read") {
        Source::Savefile(PathBuf::from(path))
    } else {
        Source::Live(matches.value_of("interface").unwrap_or_default().to_string())
    };

    Ok(Options {
        source,
        snaplen: parsed_arg(&matches, "snaplen").unwrap_or(DEFAULT_SNAPLEN),
        promisc: !matches.is_present("no-promisc"),
        output: matches.value_of("output").map(PathBuf::from),
        dedup: matches.is_present("dedup"),
        queue: parsed_arg(&matches, "queue"),
        max_sink_failures: parsed_arg(&matches, "max-sink-failures"),
        verbosity: matches.occurrences_of("verbose"),
    })
}
