//! Tar + gzip export of a tree.

use std::io;

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};
use tome_store::{ObjectStore, Tree};
use tome_types::ObjectId;
use tracing::debug;

use crate::error::{RepoError, RepoResult};

/// Build a `.tar.gz` of every file below `tree_id`. Entry names are
/// `prefix` followed by the path inside the tree; `prefix` itself is
/// emitted as a directory entry when it ends with `/`.
pub fn write_archive(store: &dyn ObjectStore, tree_id: &ObjectId, prefix: &str) -> RepoResult<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    if prefix.ends_with('/') {
        append_dir(&mut builder, prefix)?;
    }
    let files = append_tree(store, &mut builder, tree_id, prefix)?;

    let bytes = builder.into_inner()?.finish()?;
    debug!(tree = %tree_id.short_hex(), files, size = bytes.len(), "archive written");
    Ok(bytes)
}

fn append_tree<W: io::Write>(
    store: &dyn ObjectStore,
    builder: &mut Builder<W>,
    tree_id: &ObjectId,
    prefix: &str,
) -> RepoResult<usize> {
    let stored = store.read(tree_id)?.ok_or(RepoError::ObjectNotFound(*tree_id))?;
    let tree = Tree::from_stored_object(stored)?;

    let mut files = 0;
    for entry in tree.entries {
        let name = format!("{prefix}{}", entry.name);
        if entry.mode.is_directory() {
            let dir = format!("{name}/");
            append_dir(builder, &dir)?;
            files += append_tree(store, builder, &entry.object_id, &dir)?;
            continue;
        }

        let blob = store
            .read_blob(&entry.object_id)?
            .ok_or(RepoError::ObjectNotFound(entry.object_id))?;

        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(blob.data.len() as u64);
        header.set_mode(entry.mode.mode_bits() & 0o7777);
        header.set_mtime(0);
        builder.append_data(&mut header, &name, blob.data.as_slice())?;
        files += 1;
    }
    Ok(files)
}

fn append_dir<W: io::Write>(builder: &mut Builder<W>, name: &str) -> RepoResult<()> {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Directory);
    header.set_size(0);
    header.set_mode(0o755);
    header.set_mtime(0);
    builder.append_data(&mut header, name, io::empty())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use flate2::read::GzDecoder;
    use tome_store::{Blob, EntryMode, InMemoryObjectStore, TreeEntry};

    fn blob(store: &InMemoryObjectStore, data: &[u8]) -> ObjectId {
        store.write(&Blob::new(data.to_vec()).to_stored_object()).unwrap()
    }

    fn tree(store: &InMemoryObjectStore, entries: Vec<TreeEntry>) -> ObjectId {
        store.write(&Tree::new(entries).to_stored_object().unwrap()).unwrap()
    }

    fn unpack(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = tar::Archive::new(GzDecoder::new(bytes));
        archive
            .entries()
            .unwrap()
            .map(|e| {
                let mut e = e.unwrap();
                let path = e.path().unwrap().to_string_lossy().into_owned();
                let name = path.trim_end_matches('/').to_string();
                let mut data = Vec::new();
                e.read_to_end(&mut data).unwrap();
                (name, data)
            })
            .collect()
    }

    #[test]
    fn archive_contains_nested_files_under_prefix() {
        let store = InMemoryObjectStore::new();
        let intro = blob(&store, b"intro");
        let home = blob(&store, b"home");
        let guide = tree(&store, vec![TreeEntry::new(EntryMode::Regular, "intro.md", intro)]);
        let root = tree(
            &store,
            vec![
                TreeEntry::new(EntryMode::Directory, "guide", guide),
                TreeEntry::new(EntryMode::Regular, "home.md", home),
            ],
        );

        let entries = unpack(&write_archive(&store, &root, "wiki/").unwrap());
        let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["wiki", "wiki/guide", "wiki/guide/intro.md", "wiki/home.md"]);
        assert_eq!(entries[2].1, b"intro");
    }

    #[test]
    fn missing_tree_errors() {
        let store = InMemoryObjectStore::new();
        let err = write_archive(&store, &ObjectId::from_bytes(b"nope"), "x/").unwrap_err();
        assert!(matches!(err, RepoError::ObjectNotFound(_)));
    }
}
