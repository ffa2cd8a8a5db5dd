use std::io::{self, Write};

pub fn write_stdout_text(text: &str) -> io::Result<()> {
    write_chunks(&[text.as_bytes()])
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    write_chunks(&[text.as_bytes(), b"\n"])
}

// A closed pipe (`payroute route ... | head`) is not an error for us.
fn write_chunks(chunks: &[&[u8]]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for chunk in chunks {
        tolerate_broken_pipe(stdout.write_all(chunk))?;
    }
    tolerate_broken_pipe(stdout.flush())
}

fn tolerate_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::tolerate_broken_pipe;

    #[test]
    fn broken_pipe_is_swallowed() {
        let broken = Err(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(tolerate_broken_pipe(broken).is_ok());

        let denied = Err(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(tolerate_broken_pipe(denied).is_err());
    }
}
