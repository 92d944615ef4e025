//! Connection plumbing: optional block compression under the token codec.
//!
//! Both directions are buffered. With compression enabled the writer is a
//! [`BlockEncoder`] over the buffered sink and the reader a [`BlockDecoder`]
//! over the buffered source; the token codec always sits on top.

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use compress::{BlockDecoder, BlockEncoder};
use protocol::{Token, TokenReader, write_token};

use crate::config::SessionConfig;

/// Inbound half of a connection.
#[derive(Debug)]
pub enum WireReader<R: Read> {
    /// Uncompressed stream.
    Plain(BufReader<R>),
    /// Stream of compressed frames.
    Compressed(BlockDecoder<BufReader<R>>),
}

impl<R: Read> Read for WireReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(reader) => reader.read(buf),
            Self::Compressed(reader) => reader.read(buf),
        }
    }
}

impl<R: Read> BufRead for WireReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Self::Plain(reader) => reader.fill_buf(),
            Self::Compressed(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amount: usize) {
        match self {
            Self::Plain(reader) => reader.consume(amount),
            Self::Compressed(reader) => reader.consume(amount),
        }
    }
}

/// Outbound half of a connection.
#[derive(Debug)]
pub enum WireWriter<W: Write> {
    /// Uncompressed stream.
    Plain(BufWriter<W>),
    /// Stream of compressed frames.
    Compressed(BlockEncoder<BufWriter<W>>),
}

impl<W: Write> Write for WireWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(writer) => writer.write(buf),
            Self::Compressed(writer) => writer.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Self::Plain(writer) => writer.write_all(buf),
            Self::Compressed(writer) => writer.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(writer) => writer.flush(),
            Self::Compressed(writer) => writer.flush(),
        }
    }
}

/// Both halves of a connection with the token codec on top.
#[derive(Debug)]
pub struct Channel<R: Read, W: Write> {
    reader: TokenReader<WireReader<R>>,
    writer: WireWriter<W>,
}

impl<R: Read, W: Write> Channel<R, W> {
    /// Wraps a connection's halves according to `config`.
    pub fn new(reader: R, writer: W, config: &SessionConfig) -> Self {
        let capacity = config.block_size().get();
        let reader = BufReader::with_capacity(capacity, reader);
        let writer = BufWriter::with_capacity(capacity, writer);
        let (reader, writer) = match config.compression() {
            Some(level) => (
                WireReader::Compressed(BlockDecoder::new(reader)),
                WireWriter::Compressed(BlockEncoder::new(writer, config.block_size(), level)),
            ),
            None => (WireReader::Plain(reader), WireWriter::Plain(writer)),
        };
        Self {
            reader: TokenReader::new(reader),
            writer,
        }
    }

    /// Queues one token without flushing.
    pub fn send<T: AsRef<[u8]> + ?Sized>(&mut self, content: &T) -> io::Result<()> {
        write_token(&mut self.writer, content.as_ref())
    }

    /// Queues one token and flushes everything queued so far.
    pub fn send_flush<T: AsRef<[u8]> + ?Sized>(&mut self, content: &T) -> io::Result<()> {
        self.send(content)?;
        self.writer.flush()
    }

    /// Flushes queued output, emitting a frame when compressing.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Reads the next token from the peer.
    pub fn receive(&mut self) -> io::Result<Token> {
        self.reader.read_token()
    }

    /// Token source, also used for raw body reads.
    pub fn reader(&mut self) -> &mut TokenReader<WireReader<R>> {
        &mut self.reader
    }

    /// Raw sink used for body writes.
    pub fn writer(&mut self) -> &mut WireWriter<W> {
        &mut self.writer
    }
}
