//! archive
//!
//! Deterministic tar archives of scaffolded directories.
//!
//! # Layout
//!
//! Every entry is named relative to the source directory with a `./`
//! prefix: the root is `./`, directories are `./docs/`, files are
//! `./galaxy.yml`. Entries are written in sorted order with normalized
//! ownership, permissions and timestamps, so the same tree always yields
//! the same archive bytes.
//!
//! # Compression
//!
//! The v2 API family ships plain tar, the legacy v1 family ships gzip.
//! Compression is a parameter of [`create_tar`], never a constant.
//!
//! # Example
//!
//! ```no_run
//! use adt::archive::{create_tar, entry_names, Compression};
//! use std::path::Path;
//!
//! create_tar(Path::new("out/collection"), Path::new("out/collection.tar"), Compression::None)?;
//! let bytes = std::fs::read("out/collection.tar")?;
//! let names = entry_names(&bytes, Compression::None)?;
//! assert!(names.contains(&"./galaxy.yml".to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};
use thiserror::Error;

/// Errors from archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive source '{0}' does not exist or is not a directory")]
    MissingSource(PathBuf),

    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write archive '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("unsupported file type at '{0}'")]
    UnsupportedFileType(PathBuf),

    #[error("malformed archive: {0}")]
    Malformed(io::Error),
}

/// Archive compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Plain tar (`application/tar`).
    #[default]
    None,
    /// Gzip-compressed tar (`application/tar+gzip`).
    Gzip,
}

impl Compression {
    /// File extension for archives of this kind, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Compression::None => "tar",
            Compression::Gzip => "tar.gz",
        }
    }

    /// MIME type served for archives of this kind.
    pub fn content_type(&self) -> &'static str {
        match self {
            Compression::None => "application/tar",
            Compression::Gzip => "application/tar+gzip",
        }
    }

    /// Build an archive file name from a stem, e.g. `init_collection.tar`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension())
    }
}

/// A file system entry scheduled for archiving.
#[derive(Debug)]
struct PendingEntry {
    /// Absolute path on disk.
    source: PathBuf,
    /// Name inside the archive (`./`-prefixed).
    name: String,
    kind: PendingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    Directory,
    File { executable: bool },
    Symlink,
}

/// Create a tar archive of `source_dir` at `dest_file`.
///
/// # Errors
///
/// - `MissingSource` if `source_dir` is absent or not a directory. An
///   empty archive is never produced in its place.
/// - `Read` / `Write` on I/O failure.
/// - `UnsupportedFileType` for sockets, fifos and device files.
pub fn create_tar(
    source_dir: &Path,
    dest_file: &Path,
    compression: Compression,
) -> Result<(), ArchiveError> {
    if !source_dir.is_dir() {
        return Err(ArchiveError::MissingSource(source_dir.to_path_buf()));
    }

    let mut entries = vec![PendingEntry {
        source: source_dir.to_path_buf(),
        name: "./".to_string(),
        kind: PendingKind::Directory,
    }];
    collect_entries(source_dir, Path::new(""), &mut entries)?;

    let write_err = |source: io::Error| ArchiveError::Write {
        path: dest_file.to_path_buf(),
        source,
    };

    let file = File::create(dest_file).map_err(write_err)?;
    match compression {
        Compression::None => {
            let mut file = write_entries(file, &entries)?;
            file.flush().map_err(write_err)?;
        }
        Compression::Gzip => {
            let encoder = GzEncoder::new(file, flate2::Compression::default());
            let encoder = write_entries(encoder, &entries)?;
            let mut file = encoder.finish().map_err(write_err)?;
            file.flush().map_err(write_err)?;
        }
    }
    Ok(())
}

/// List the entry names of an in-memory archive, in archive order.
///
/// # Errors
///
/// Returns `Malformed` if the bytes are not a readable archive.
pub fn entry_names(bytes: &[u8], compression: Compression) -> Result<Vec<String>, ArchiveError> {
    match compression {
        Compression::None => read_names(bytes),
        Compression::Gzip => read_names(GzDecoder::new(bytes)),
    }
}

fn read_names<R: Read>(reader: R) -> Result<Vec<String>, ArchiveError> {
    let mut archive = tar::Archive::new(reader);
    let mut names = Vec::new();
    for entry in archive.entries().map_err(ArchiveError::Malformed)? {
        let entry = entry.map_err(ArchiveError::Malformed)?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        names.push(name);
    }
    Ok(names)
}

/// Walk `dir` depth-first in sorted order, appending entries for everything below it.
fn collect_entries(
    dir: &Path,
    relative: &Path,
    entries: &mut Vec<PendingEntry>,
) -> Result<(), ArchiveError> {
    let read_err = |source: io::Error| ArchiveError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut children = fs::read_dir(dir)
        .map_err(read_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;
    children.sort();

    for child in children {
        let Some(file_name) = child.file_name() else {
            continue;
        };
        let child_relative = relative.join(file_name);
        let name = archive_name(&child_relative)?;
        let metadata = fs::symlink_metadata(&child).map_err(|source| ArchiveError::Read {
            path: child.clone(),
            source,
        })?;
        let file_type = metadata.file_type();

        if file_type.is_dir() {
            entries.push(PendingEntry {
                source: child.clone(),
                name: format!("{}/", name),
                kind: PendingKind::Directory,
            });
            collect_entries(&child, &child_relative, entries)?;
        } else if file_type.is_file() {
            entries.push(PendingEntry {
                source: child,
                name,
                kind: PendingKind::File {
                    executable: is_executable(&metadata),
                },
            });
        } else if file_type.is_symlink() {
            entries.push(PendingEntry {
                source: child,
                name,
                kind: PendingKind::Symlink,
            });
        } else {
            return Err(ArchiveError::UnsupportedFileType(child));
        }
    }
    Ok(())
}

/// Render a relative path as a `./`-prefixed archive name with `/` separators.
fn archive_name(relative: &Path) -> Result<String, ArchiveError> {
    let mut name = String::from(".");
    for component in relative.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| ArchiveError::NonUtf8Path(relative.to_path_buf()))?;
        name.push('/');
        name.push_str(part);
    }
    Ok(name)
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

fn write_entries<W: Write>(writer: W, entries: &[PendingEntry]) -> Result<W, ArchiveError> {
    let mut builder = Builder::new(writer);
    for entry in entries {
        append_entry(&mut builder, entry)?;
    }
    builder.into_inner().map_err(|source| ArchiveError::Write {
        path: PathBuf::from("<archive>"),
        source,
    })
}

fn append_entry<W: Write>(
    builder: &mut Builder<W>,
    entry: &PendingEntry,
) -> Result<(), ArchiveError> {
    let write_err = |source: io::Error| ArchiveError::Write {
        path: entry.source.clone(),
        source,
    };

    let mut header = Header::new_gnu();
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);

    match entry.kind {
        PendingKind::Directory => {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            set_entry_name(builder, &mut header, &entry.name).map_err(write_err)?;
            header.set_cksum();
            builder.append(&header, io::empty()).map_err(write_err)?;
        }
        PendingKind::File { executable } => {
            let data = fs::read(&entry.source).map_err(|source| ArchiveError::Read {
                path: entry.source.clone(),
                source,
            })?;
            header.set_entry_type(EntryType::Regular);
            header.set_mode(if executable { 0o755 } else { 0o644 });
            header.set_size(data.len() as u64);
            set_entry_name(builder, &mut header, &entry.name).map_err(write_err)?;
            header.set_cksum();
            builder.append(&header, data.as_slice()).map_err(write_err)?;
        }
        PendingKind::Symlink => {
            let target = fs::read_link(&entry.source).map_err(|source| ArchiveError::Read {
                path: entry.source.clone(),
                source,
            })?;
            header.set_entry_type(EntryType::Symlink);
            header.set_mode(0o777);
            header.set_size(0);
            header.set_link_name(&target).map_err(write_err)?;
            set_entry_name(builder, &mut header, &entry.name).map_err(write_err)?;
            header.set_cksum();
            builder.append(&header, io::empty()).map_err(write_err)?;
        }
    }
    Ok(())
}

/// Write the entry name into the header verbatim.
///
/// `Header::set_path` strips `./` components, so the name bytes are copied
/// directly. Names longer than the 100-byte field get a preceding GNU
/// long-name record.
fn set_entry_name<W: Write>(
    builder: &mut Builder<W>,
    header: &mut Header,
    name: &str,
) -> io::Result<()> {
    let bytes = name.as_bytes();
    let slot = &mut header.as_old_mut().name;

    if bytes.len() > slot.len() {
        let mut long = Header::new_gnu();
        let marker = b"././@LongLink";
        long.as_old_mut().name[..marker.len()].copy_from_slice(marker);
        long.set_entry_type(EntryType::GNULongName);
        long.set_mode(0o644);
        long.set_uid(0);
        long.set_gid(0);
        long.set_mtime(0);
        long.set_size(bytes.len() as u64 + 1);
        long.set_cksum();

        let mut data = bytes.to_vec();
        data.push(0);
        builder.append(&long, data.as_slice())?;

        let truncated = slot.len();
        slot.copy_from_slice(&bytes[..truncated]);
    } else {
        slot[..bytes.len()].copy_from_slice(bytes);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        fs::create_dir_all(root.join("roles/run/tasks")).unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("galaxy.yml"), "namespace: demo\n").unwrap();
        fs::write(root.join("roles/run/tasks/main.yml"), "---\n").unwrap();
        temp
    }

    #[test]
    fn entries_are_dot_prefixed_and_sorted() {
        let temp = sample_tree();
        let dest = temp.path().join("out.tar");
        create_tar(&temp.path().join("project"), &dest, Compression::None).unwrap();

        let names = entry_names(&fs::read(&dest).unwrap(), Compression::None).unwrap();
        assert_eq!(
            names,
            vec![
                "./",
                "./docs/",
                "./galaxy.yml",
                "./roles/",
                "./roles/run/",
                "./roles/run/tasks/",
                "./roles/run/tasks/main.yml",
            ]
        );
        assert!(names.iter().all(|n| n.starts_with("./")));
    }

    #[test]
    fn gzip_archive_lists_same_entries() {
        let temp = sample_tree();
        let plain = temp.path().join("out.tar");
        let gz = temp.path().join("out.tar.gz");
        let source = temp.path().join("project");
        create_tar(&source, &plain, Compression::None).unwrap();
        create_tar(&source, &gz, Compression::Gzip).unwrap();

        let gz_bytes = fs::read(&gz).unwrap();
        assert_eq!(&gz_bytes[..2], &[0x1f, 0x8b]);
        assert_eq!(
            entry_names(&fs::read(&plain).unwrap(), Compression::None).unwrap(),
            entry_names(&gz_bytes, Compression::Gzip).unwrap()
        );
    }

    #[test]
    fn same_tree_yields_identical_bytes() {
        let temp = sample_tree();
        let source = temp.path().join("project");
        let first = temp.path().join("first.tar");
        let second = temp.path().join("second.tar");
        create_tar(&source, &first, Compression::None).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        fs::write(source.join("galaxy.yml"), "namespace: demo\n").unwrap();
        create_tar(&source, &second, Compression::None).unwrap();

        assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
    }

    #[test]
    fn missing_source_fails_loudly() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.tar");
        let err = create_tar(&temp.path().join("absent"), &dest, Compression::None).unwrap_err();

        assert!(matches!(err, ArchiveError::MissingSource(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn long_names_survive() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let deep = root.join("a".repeat(60)).join("b".repeat(60));
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("file.txt"), "x").unwrap();

        let dest = temp.path().join("out.tar");
        create_tar(&root, &dest, Compression::None).unwrap();
        let names = entry_names(&fs::read(&dest).unwrap(), Compression::None).unwrap();

        let expected = format!("./{}/{}/file.txt", "a".repeat(60), "b".repeat(60));
        assert!(names.contains(&expected), "{:?}", names);
    }

    #[test]
    fn compression_naming() {
        assert_eq!(Compression::None.file_name("init_collection"), "init_collection.tar");
        assert_eq!(Compression::Gzip.file_name("ns.name"), "ns.name.tar.gz");
        assert_eq!(Compression::None.content_type(), "application/tar");
        assert_eq!(Compression::Gzip.content_type(), "application/tar+gzip");
    }
}
