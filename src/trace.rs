use std::{
    fs,
    io::{self, BufRead, BufReader, Read},
    path::PathBuf,
    thread::{self, JoinHandle},
};

use crossbeam::channel::{Receiver, Sender};
use log::error;
use xz2::read::XzDecoder;

/// Streams whitespace-separated binary addresses off the trace in batches,
/// so the simulation loop never blocks on I/O directly. The channel closes
/// once the trace is exhausted.
pub struct Trace {
    pub rec: Receiver<Vec<String>>,
    _thread: JoinHandle<()>,
}

impl Trace {
    /// Opens a trace file, decompressing paths ending in `.xz`.
    pub fn open(
        path: PathBuf,
        addrs_per_block: usize,
        blocks_per_queue: usize,
    ) -> io::Result<Trace> {
        let file = fs::File::open(&path)?;
        let stream: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "xz") {
            Box::new(XzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Trace::from_stream(stream, addrs_per_block, blocks_per_queue))
    }

    /// Reads the trace from any stream (stdin when no trace file is given).
    pub fn from_stream(
        stream: Box<dyn Read + Send>,
        addrs_per_block: usize,
        blocks_per_queue: usize,
    ) -> Trace {
        let (sender, receiver) = crossbeam::channel::bounded(blocks_per_queue);

        let t = thread::spawn(move || Trace::run_thread(stream, addrs_per_block, sender));

        Trace {
            rec: receiver,
            _thread: t,
        }
    }

    fn run_thread(stream: Box<dyn Read + Send>, addrs_per_block: usize, queue: Sender<Vec<String>>) {
        let reader = BufReader::new(stream);
        let mut block = Vec::with_capacity(addrs_per_block);
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    error!("trace read failed: {err}");
                    return;
                }
            };
            for addr in line.split_whitespace() {
                block.push(addr.to_owned());
                if block.len() == addrs_per_block {
                    let full = std::mem::replace(&mut block, Vec::with_capacity(addrs_per_block));
                    if queue.send(full).is_err() {
                        return;
                    }
                }
            }
        }
        if !block.is_empty() {
            let _ = queue.send(block);
        }
    }
}
