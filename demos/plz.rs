use plz::progress::{Bar, Progress};
use plz::{Decoder, Encoder, FileSink, FileSource, Splitter, Stage};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::{env, process};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let decompress = args.first().map_or(false, |a| a == "-d");
    if decompress {
        args.remove(0);
    }
    if args.len() != 2 {
        eprintln!("usage: plz [-d] INPUT OUTPUT");
        process::exit(2);
    }

    let file_in = File::open(&args[0])?;
    let total = file_in.metadata()?.len();
    let file_out = File::create(&args[1])?;

    let sink = FileSink::new(BufWriter::new(file_out)).close_writer(true);
    let codec: Box<dyn Stage<u8>> = if decompress {
        Box::new(Decoder::new(sink))
    } else {
        Box::new(Encoder::new(sink))
    };
    let bar = Bar::new(io::stderr()).message(if decompress { "decompressing" } else { "compressing" });
    let mut head = Splitter::new(Progress::new(codec, total, bar));
    FileSource::new(BufReader::new(file_in)).run(&mut head)?;

    Ok(())
}
