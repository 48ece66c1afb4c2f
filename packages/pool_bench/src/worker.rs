use std::io::{BufRead, Write};

use crate::wire::{Response, decode_request, encode_response};
use crate::{Result, compute};

/// Runs the worker side of the process pool protocol until `input` reaches end of file.
///
/// Every request line read from `input` is answered with exactly one response line on
/// `output`, flushed immediately so the coordinator is never left waiting on a buffer.
///
/// Returns the number of requests served.
///
/// # Errors
///
/// Returns an error if a request is malformed or if either stream fails. The worker does not
/// attempt to resynchronize; the coordinator treats any worker failure as fatal.
pub fn serve(input: impl BufRead, mut output: impl Write) -> Result<usize> {
    let mut served: usize = 0;

    for line in input.lines() {
        let line = line?;

        if line.is_empty() {
            continue;
        }

        let request = decode_request(&line)?;

        let response = Response {
            index: request.index,
            sum: compute(request.n),
        };

        output.write_all(encode_response(response).as_bytes())?;
        output.flush()?;

        served = served.saturating_add(1);
    }

    tracing::trace!(served, "worker input closed");

    Ok(served)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::Error;

    #[test]
    fn answers_each_request() {
        let input = Cursor::new("0 3\n1 10\n2 1\n");
        let mut output = Vec::new();

        let served = serve(input, &mut output).unwrap();

        assert_eq!(served, 3);
        assert_eq!(String::from_utf8(output).unwrap(), "0 6\n1 55\n2 1\n");
    }

    #[test]
    fn empty_input_serves_nothing() {
        let mut output = Vec::new();

        let served = serve(Cursor::new(""), &mut output).unwrap();

        assert_eq!(served, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn skips_blank_lines() {
        let mut output = Vec::new();

        let served = serve(Cursor::new("\n5 4\n\n"), &mut output).unwrap();

        assert_eq!(served, 1);
        assert_eq!(String::from_utf8(output).unwrap(), "5 10\n");
    }

    #[test]
    fn malformed_request_is_fatal() {
        let mut output = Vec::new();

        let result = serve(Cursor::new("0 2\nnonsense\n1 2\n"), &mut output);

        assert!(matches!(result, Err(Error::Protocol { .. })));
        // The request before the bad line was still answered.
        assert_eq!(String::from_utf8(output).unwrap(), "0 3\n");
    }
}
