use quick_error::quick_error;
use std::path::PathBuf;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        TooManyCommits(count: usize) {
            display(
                "Cannot write a commit-graph with {} commits; the format's reserved sentinel values start at {}",
                count, 0x7000_0000u32
            )
        }
        Collaborator(err: Box<dyn std::error::Error + Send + Sync>) {
            display("Object store adapter or commit resolver failed: {}", err)
            source(err.as_ref())
        }
        LockHeld(path: PathBuf) {
            display("Another writer already holds the lock at '{}'", path.display())
        }
        Io(err: std::io::Error, path: PathBuf) {
            display("I/O error at '{}'", path.display())
            source(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
