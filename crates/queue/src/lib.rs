//! Blog Studio topic queue infrastructure.
//!
//! Implements the [`pipeline::TopicSource`] trait over a plain UTF-8 text file
//! holding one topic line per line.
//!
//! ## Pop semantics
//!
//! [`FileTopicQueue::next_topic`] removes the first non-blank line and returns
//! it. For the duration of the pop an exclusive `fs2` lock is held on a
//! sibling `<queue>.lock` file; the queue itself is read only after the lock
//! is granted. The remainder is written to a sibling temp file, and the temp
//! file is renamed over the queue. A crash mid-pop leaves either the old or
//! the new queue on disk, never a truncated one.
//!
//! The lock lives on a separate file because the rename replaces the queue's
//! inode: a lock taken on the queue file would be held on a file that is no
//! longer the queue once a concurrent pop finishes.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File handling lives here; the [`pipeline`] crate sees
//! only [`pipeline::TopicSource`].

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use pipeline::{PipelineError, TopicLine, TopicSource};
use tracing::{debug, info};

/// File-backed destructive topic queue.
#[derive(Debug, Clone)]
pub struct FileTopicQueue {
    path: PathBuf,
}

impl FileTopicQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, message: impl std::fmt::Display) -> PipelineError {
        PipelineError::Queue {
            path: self.path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// `<queue file name><suffix>` in the queue's directory.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "topics".into());
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// The file every pop locks. It is never renamed or removed.
    pub fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    /// Blocks until this process holds the queue lock.
    fn lock(&self) -> Result<File, PipelineError> {
        if !self.path.exists() {
            return Err(self.error("queue file not found"));
        }
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| self.error(format!("failed to open lock file: {e}")))?;
        lock.lock_exclusive()
            .map_err(|e| self.error(format!("failed to lock queue: {e}")))?;
        Ok(lock)
    }

    fn read(&self) -> Result<String, PipelineError> {
        let mut file = File::open(&self.path).map_err(|e| match e.kind() {
            IoErrorKind::NotFound => self.error("queue file not found"),
            _ => self.error(format!("failed to open queue file: {e}")),
        })?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| self.error(format!("failed to read queue file: {e}")))?;
        Ok(contents)
    }

    /// Writes `contents` to a sibling temp file and renames it over the queue.
    fn replace_contents(&self, contents: &str) -> Result<(), PipelineError> {
        let temp_path = self.sibling(".tmp");

        {
            let mut temp = File::create(&temp_path)
                .map_err(|e| self.error(format!("failed to create temp file: {e}")))?;
            temp.write_all(contents.as_bytes())
                .and_then(|()| temp.sync_all())
                .map_err(|e| self.error(format!("failed to write temp file: {e}")))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            self.error(format!(
                "failed to rename {} over queue: {e}",
                temp_path.display()
            ))
        })
    }
}

impl TopicSource for FileTopicQueue {
    fn next_topic(&self) -> Result<Option<TopicLine>, PipelineError> {
        let _lock = self.lock()?;
        let contents = self.read()?;

        let mut lines = contents.lines();
        let mut skipped = 0usize;
        let topic = loop {
            match lines.next() {
                Some(line) => match TopicLine::new(line) {
                    Some(topic) => break Some(topic),
                    None => skipped += 1,
                },
                None => break None,
            }
        };

        if topic.is_none() && skipped == 0 {
            debug!(path = %self.path.display(), "Topic queue is empty");
            return Ok(None);
        }

        let remaining: Vec<&str> = lines.collect();
        let mut rest = remaining.join("\n");
        if !rest.is_empty() {
            rest.push('\n');
        }
        self.replace_contents(&rest)?;

        // Lock is released when `_lock` is dropped.
        match &topic {
            Some(topic) => info!(
                path = %self.path.display(),
                remaining = remaining.len(),
                topic = topic.as_str(),
                "Popped topic from queue"
            ),
            None => debug!(skipped, "Topic queue held only blank lines"),
        }
        Ok(topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    use pipeline::ErrorKind;
    use tempfile::TempDir;

    fn queue_with(contents: &str) -> (TempDir, FileTopicQueue) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("topics.txt");
        fs::write(&path, contents).unwrap();
        (dir, FileTopicQueue::new(path))
    }

    #[test]
    fn pops_first_line_and_rewrites_remainder() {
        let (_dir, queue) = queue_with("Primary: A\nPrimary: B\nPrimary: C\n");

        let topic = queue.next_topic().unwrap().unwrap();
        assert_eq!(topic.as_str(), "Primary: A");
        assert_eq!(
            fs::read_to_string(queue.path()).unwrap(),
            "Primary: B\nPrimary: C\n"
        );
    }

    #[test]
    fn same_topic_is_never_served_twice() {
        let (_dir, queue) = queue_with("Primary: A\nPrimary: B");

        assert_eq!(queue.next_topic().unwrap().unwrap().as_str(), "Primary: A");
        assert_eq!(queue.next_topic().unwrap().unwrap().as_str(), "Primary: B");
        assert!(queue.next_topic().unwrap().is_none());
        assert_eq!(fs::read_to_string(queue.path()).unwrap(), "");
    }

    #[test]
    fn empty_file_is_empty_queue() {
        let (_dir, queue) = queue_with("");
        assert!(queue.next_topic().unwrap().is_none());
    }

    #[test]
    fn leading_blank_lines_are_skipped_and_removed() {
        let (_dir, queue) = queue_with("\n   \nPrimary: A\n");
        assert_eq!(queue.next_topic().unwrap().unwrap().as_str(), "Primary: A");
        assert_eq!(fs::read_to_string(queue.path()).unwrap(), "");

        let (_dir, queue) = queue_with("\n\n");
        assert!(queue.next_topic().unwrap().is_none());
        assert_eq!(fs::read_to_string(queue.path()).unwrap(), "");
    }

    #[test]
    fn missing_file_is_a_queue_error() {
        let dir = TempDir::new().unwrap();
        let queue = FileTopicQueue::new(dir.path().join("missing.txt"));

        let err = queue.next_topic().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Queue);
        assert!(err.to_string().contains("queue file not found"));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let (dir, queue) = queue_with("Primary: A\n");
        queue.next_topic().unwrap();
        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["topics.txt".to_string(), "topics.txt.lock".to_string()]
        );
    }

    #[test]
    fn waiting_pop_sees_the_queue_left_by_the_lock_holder() {
        let (_dir, queue) = queue_with("Primary: A\nPrimary: B\n");

        // Another process is mid-pop: it holds the lock and has already
        // taken "Primary: A".
        let holder = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(queue.lock_path())
            .unwrap();
        holder.lock_exclusive().unwrap();

        let waiter = {
            let queue = queue.clone();
            thread::spawn(move || queue.next_topic())
        };
        thread::sleep(Duration::from_millis(100));

        let temp = queue.path().with_file_name("holder.tmp");
        fs::write(&temp, "Primary: B\n").unwrap();
        fs::rename(&temp, queue.path()).unwrap();
        FileExt::unlock(&holder).unwrap();

        let served = waiter.join().unwrap().unwrap().unwrap();
        assert_eq!(served.as_str(), "Primary: B");
        assert_eq!(fs::read_to_string(queue.path()).unwrap(), "");
    }
}
