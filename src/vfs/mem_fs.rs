//! The in-memory filesystem engine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::core::{FileStream, FileSystem, FsId, Result, SpecialFolder};
use crate::error::{FsError, PathKind};
use crate::path::canonical;
use crate::path::{Drive, PathParser, RootedCanonicalPath, RootedDirectory, RootedFile};
use crate::vfs::node::{NodeId, NodeTree, ROOT, TreeConflict};
use crate::vfs::stream::MemoryStream;

static NEXT_FS_ID: AtomicU64 = AtomicU64::new(1);

const TEMP_DIRECTORY: &str = r"c:\Users\dude\AppData\Local\Temp";

/// Directories every fresh instance starts with, the special-folder table
/// plus the system drive they live on.
const TEMPLATE_DIRECTORIES: [&str; 8] = [
    r"c:\Users\dude\AppData\Roaming",
    r"c:\Users\dude\AppData\Local\Temp",
    r"c:\Users\dude\Desktop",
    r"c:\Users\dude\Documents",
    r"c:\ProgramData",
    r"c:\Program Files",
    r"c:\Windows\System32",
    r"c:\temp",
];

fn special_folder_path(folder: SpecialFolder) -> Option<&'static str> {
    match folder {
        SpecialFolder::ApplicationData => Some(r"c:\Users\dude\AppData\Roaming"),
        SpecialFolder::CommonApplicationData => Some(r"c:\ProgramData"),
        SpecialFolder::Desktop => Some(r"c:\Users\dude\Desktop"),
        SpecialFolder::Documents => Some(r"c:\Users\dude\Documents"),
        SpecialFolder::LocalApplicationData => Some(r"c:\Users\dude\AppData\Local"),
        SpecialFolder::MyComputer => None,
        SpecialFolder::ProgramFiles => Some(r"c:\Program Files"),
        SpecialFolder::System => Some(r"c:\Windows\System32"),
        SpecialFolder::Temp => Some(TEMP_DIRECTORY),
        SpecialFolder::UserProfile => Some(r"c:\Users\dude"),
    }
}

pub(crate) struct FsInner {
    pub(crate) tree: NodeTree,
    current_directory: String,
}

/// An in-memory filesystem.
///
/// All files and directories live in a node tree behind the handle; cloning
/// the handle shares the same tree. A fresh instance carries the system
/// drive `c:` populated with the special-folder layout, and its current
/// directory set to the Temp folder.
///
/// Rooted path values are created through the `*_describing` factories and
/// stay bound to this instance; mixing values of two instances in one
/// operation is rejected.
#[derive(Clone)]
pub struct MemoryFs {
    inner: Arc<RwLock<FsInner>>,
    id: FsId,
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut tree = NodeTree::new();
        for path in TEMPLATE_DIRECTORIES {
            mkdir_chain(&mut tree, path);
        }
        MemoryFs {
            inner: Arc::new(RwLock::new(FsInner {
                tree,
                current_directory: TEMP_DIRECTORY.to_owned(),
            })),
            id: FsId(NEXT_FS_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    /// A fresh instance with additional drives next to the system drive.
    pub fn with_drives<I, S>(drives: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fs = MemoryFs::new();
        {
            let mut inner = fs.write_lock()?;
            for name in drives {
                let drive = canonical::drive(name.as_ref())?;
                if inner.tree.create_or_reuse_folder(ROOT, &drive).is_err() {
                    return Err(FsError::already_exists(drive));
                }
            }
        }
        Ok(fs)
    }

    fn handle(&self) -> Arc<dyn FileSystem> {
        Arc::new(self.clone())
    }

    /// A file descriptor for the given rooted path. The path is validated
    /// and canonicalized; the file itself need not exist.
    pub fn file_describing(&self, path: &str) -> Result<RootedFile> {
        RootedFile::describing(self.handle(), path)
    }

    /// A directory descriptor for the given rooted path.
    pub fn directory_describing(&self, path: &str) -> Result<RootedDirectory> {
        RootedDirectory::describing(self.handle(), path)
    }

    /// A drive descriptor for the given drive name, e.g. `c:`.
    pub fn drive_describing(&self, name: &str) -> Result<Drive> {
        Drive::new(self.handle(), name)
    }

    /// A file descriptor for a path that may be relative; a relative path
    /// is resolved against the current directory.
    pub fn file_from_current_directory(&self, path: &str) -> Result<RootedFile> {
        if canonical::is_rooted(path) {
            self.file_describing(path)
        } else {
            let base = self.read_lock()?.current_directory.clone();
            self.file_describing(&canonical::combine(&base, path))
        }
    }

    /// A directory descriptor for a path that may be relative.
    pub fn directory_from_current_directory(&self, path: &str) -> Result<RootedDirectory> {
        if canonical::is_rooted(path) {
            self.directory_describing(path)
        } else {
            let base = self.read_lock()?.current_directory.clone();
            self.directory_describing(&canonical::combine(&base, path))
        }
    }

    pub fn current_directory(&self) -> Result<RootedDirectory> {
        let base = self.read_lock()?.current_directory.clone();
        Ok(RootedDirectory::from_validated(self.handle(), base))
    }

    pub fn temporary_directory(&self) -> Result<RootedDirectory> {
        Ok(RootedDirectory::from_validated(
            self.handle(),
            TEMP_DIRECTORY.to_owned(),
        ))
    }

    pub fn special_folder(&self, folder: SpecialFolder) -> Result<RootedDirectory> {
        match special_folder_path(folder) {
            Some(path) => Ok(RootedDirectory::from_validated(
                self.handle(),
                path.to_owned(),
            )),
            None => Err(FsError::NotSupported {
                what: format!("{folder:?} cannot be denoted by a directory path"),
            }),
        }
    }

    /// All drives present in the tree.
    pub fn drives(&self) -> Result<Vec<Drive>> {
        let names = <Self as FileSystem>::drives(self)?;
        Ok(names
            .into_iter()
            .map(|name| Drive::already_validated(self.handle(), name))
            .collect())
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, FsInner>> {
        self.inner.read().map_err(|_| FsError::Lock)
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, FsInner>> {
        self.inner.write().map_err(|_| FsError::Lock)
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        MemoryFs::new()
    }
}

fn mkdir_chain(tree: &mut NodeTree, canonical: &str) {
    let parser = PathParser::new(canonical);
    let mut at = ROOT;
    for segment in parser.segments() {
        match tree.create_or_reuse_folder(at, segment) {
            Ok(next) => at = next,
            Err(_) => return,
        }
    }
}

fn resolve(tree: &NodeTree, canonical: &str) -> Option<NodeId> {
    let parser = PathParser::new(canonical);
    let mut at = ROOT;
    for segment in parser.segments() {
        at = tree.find_child(at, segment)?;
    }
    Some(at)
}

fn resolve_file(tree: &NodeTree, path: &RootedCanonicalPath) -> Result<NodeId> {
    match resolve(tree, path.as_str()) {
        Some(id) if tree.node(id).is_some_and(|node| node.is_file()) => Ok(id),
        Some(_) => Err(FsError::wrong_type(path.as_str(), PathKind::File)),
        None => Err(FsError::not_found(path.as_str())),
    }
}

fn resolve_folder(tree: &NodeTree, path: &RootedCanonicalPath) -> Result<NodeId> {
    match resolve(tree, path.as_str()) {
        Some(id) if tree.node(id).is_some_and(|node| node.is_folder()) => Ok(id),
        Some(_) => Err(FsError::wrong_type(path.as_str(), PathKind::Directory)),
        None => Err(FsError::not_found(path.as_str())),
    }
}

fn parent_path(canonical: &str) -> Option<String> {
    let parser = PathParser::new(canonical);
    let intermediate = parser.intermediate_segments();
    if intermediate.is_empty() {
        return None;
    }
    let mut path = intermediate[0].clone();
    for segment in &intermediate[1..] {
        path.push(canonical::SEPARATOR);
        path.push_str(segment);
    }
    Some(path)
}

/// Resolves the parent folder of a path that need not exist itself, and
/// hands back the leaf name.
fn resolve_parent<'a>(
    tree: &NodeTree,
    path: &'a RootedCanonicalPath,
) -> Result<(NodeId, &'a str)> {
    let canonical = path.as_str();
    let parent = parent_path(canonical).ok_or_else(|| {
        FsError::invalid_operation(format!("'{canonical}' has no parent directory"))
    })?;
    match resolve(tree, &parent) {
        Some(id) if tree.node(id).is_some_and(|node| node.is_folder()) => {
            Ok((id, &canonical[parent.len() + 1..]))
        }
        Some(_) => Err(FsError::wrong_type(parent, PathKind::Directory)),
        None => Err(FsError::not_found(parent)),
    }
}

fn same_drive(a: &str, b: &str) -> bool {
    match (canonical::split_drive(a), canonical::split_drive(b)) {
        (Some((da, _)), Some((db, _))) => da.eq_ignore_ascii_case(&db),
        _ => false,
    }
}

/// True when `path` lies strictly inside the subtree at `prefix`.
fn lies_inside(prefix: &str, path: &str) -> bool {
    // A non-boundary index means a segment name diverges mid-character,
    // so `path` cannot sit under `prefix`.
    let boundary = prefix.len();
    path.len() > boundary
        && path.is_char_boundary(boundary)
        && path[..boundary].eq_ignore_ascii_case(prefix)
        && path[boundary..].starts_with(canonical::SEPARATOR)
}

fn join(parent: &str, leaf: &str) -> String {
    format!("{parent}{}{leaf}", canonical::SEPARATOR)
}

/// Finds the existing file at `path` or creates an empty one under its
/// existing parent. Returns the node, its generation tag and a content
/// snapshot.
fn open_or_create(
    tree: &mut NodeTree,
    path: &RootedCanonicalPath,
) -> Result<(NodeId, u64, Vec<u8>)> {
    if let Some(existing) = resolve(tree, path.as_str()) {
        let node = tree
            .node(existing)
            .ok_or_else(|| FsError::not_found(path.as_str()))?;
        return match node.content() {
            Some(content) => Ok((existing, node.generation, content.clone())),
            None => Err(FsError::wrong_type(path.as_str(), PathKind::File)),
        };
    }
    let (parent, leaf) = resolve_parent(tree, path)?;
    let id = tree
        .create_file(parent, leaf)
        .map_err(|_| FsError::already_exists(path.as_str()))?;
    let generation = tree.node(id).map(|node| node.generation).unwrap_or(0);
    Ok((id, generation, Vec::new()))
}

impl FileSystem for MemoryFs {
    fn fs_id(&self) -> FsId {
        self.id
    }

    fn is_file(&self, path: &RootedCanonicalPath) -> bool {
        self.inner
            .read()
            .map(|inner| {
                resolve(&inner.tree, path.as_str())
                    .and_then(|id| inner.tree.node(id))
                    .is_some_and(|node| node.is_file())
            })
            .unwrap_or(false)
    }

    fn is_directory(&self, path: &RootedCanonicalPath) -> bool {
        self.inner
            .read()
            .map(|inner| {
                resolve(&inner.tree, path.as_str())
                    .and_then(|id| inner.tree.node(id))
                    .is_some_and(|node| node.is_folder())
            })
            .unwrap_or(false)
    }

    fn file_size(&self, path: &RootedCanonicalPath) -> Result<u64> {
        let inner = self.read_lock()?;
        let id = resolve_file(&inner.tree, path)?;
        Ok(inner
            .tree
            .node(id)
            .and_then(|node| node.content())
            .map(|content| content.len() as u64)
            .unwrap_or(0))
    }

    fn file_last_modified(&self, path: &RootedCanonicalPath) -> Result<SystemTime> {
        let inner = self.read_lock()?;
        let id = resolve_file(&inner.tree, path)?;
        let node = inner
            .tree
            .node(id)
            .ok_or_else(|| FsError::not_found(path.as_str()))?;
        Ok(node.times.modified)
    }

    fn set_file_last_modified(&self, path: &RootedCanonicalPath, at: SystemTime) -> Result<()> {
        let mut inner = self.write_lock()?;
        let id = resolve_file(&inner.tree, path)?;
        if let Some(node) = inner.tree.node_mut(id) {
            node.times.modified = at;
        }
        Ok(())
    }

    fn directory_last_modified(&self, path: &RootedCanonicalPath) -> Result<SystemTime> {
        let inner = self.read_lock()?;
        let id = resolve_folder(&inner.tree, path)?;
        let node = inner
            .tree
            .node(id)
            .ok_or_else(|| FsError::not_found(path.as_str()))?;
        Ok(node.times.modified)
    }

    fn set_directory_last_modified(
        &self,
        path: &RootedCanonicalPath,
        at: SystemTime,
    ) -> Result<()> {
        let mut inner = self.write_lock()?;
        let id = resolve_folder(&inner.tree, path)?;
        if let Some(node) = inner.tree.node_mut(id) {
            node.times.modified = at;
        }
        Ok(())
    }

    fn file_last_accessed(&self, path: &RootedCanonicalPath) -> Result<SystemTime> {
        let inner = self.read_lock()?;
        let id = resolve_file(&inner.tree, path)?;
        let node = inner
            .tree
            .node(id)
            .ok_or_else(|| FsError::not_found(path.as_str()))?;
        Ok(node.times.accessed)
    }

    fn set_file_last_accessed(&self, path: &RootedCanonicalPath, at: SystemTime) -> Result<()> {
        let mut inner = self.write_lock()?;
        let id = resolve_file(&inner.tree, path)?;
        if let Some(node) = inner.tree.node_mut(id) {
            node.times.accessed = at;
        }
        Ok(())
    }

    fn directory_last_accessed(&self, path: &RootedCanonicalPath) -> Result<SystemTime> {
        let inner = self.read_lock()?;
        let id = resolve_folder(&inner.tree, path)?;
        let node = inner
            .tree
            .node(id)
            .ok_or_else(|| FsError::not_found(path.as_str()))?;
        Ok(node.times.accessed)
    }

    fn set_directory_last_accessed(
        &self,
        path: &RootedCanonicalPath,
        at: SystemTime,
    ) -> Result<()> {
        let mut inner = self.write_lock()?;
        let id = resolve_folder(&inner.tree, path)?;
        if let Some(node) = inner.tree.node_mut(id) {
            node.times.accessed = at;
        }
        Ok(())
    }

    fn files_in_directory(&self, path: &RootedCanonicalPath) -> Result<Vec<RootedCanonicalPath>> {
        let inner = self.read_lock()?;
        let id = resolve_folder(&inner.tree, path)?;
        let node = inner
            .tree
            .node(id)
            .ok_or_else(|| FsError::not_found(path.as_str()))?;
        let mut out = Vec::new();
        for &child in node.children() {
            if let Some(child_node) = inner.tree.node(child) {
                if child_node.is_file() {
                    out.push(RootedCanonicalPath::new(join(
                        path.as_str(),
                        &child_node.name,
                    )));
                }
            }
        }
        Ok(out)
    }

    fn directories_in_directory(
        &self,
        path: &RootedCanonicalPath,
    ) -> Result<Vec<RootedCanonicalPath>> {
        let inner = self.read_lock()?;
        let id = resolve_folder(&inner.tree, path)?;
        let node = inner
            .tree
            .node(id)
            .ok_or_else(|| FsError::not_found(path.as_str()))?;
        let mut out = Vec::new();
        for &child in node.children() {
            if let Some(child_node) = inner.tree.node(child) {
                if child_node.is_folder() {
                    out.push(RootedCanonicalPath::new(join(
                        path.as_str(),
                        &child_node.name,
                    )));
                }
            }
        }
        Ok(out)
    }

    fn create_directory(&self, path: &RootedCanonicalPath) -> Result<()> {
        let mut inner = self.write_lock()?;
        let parser = PathParser::new(path.as_str());
        let drive = parser.drive_name();
        let mut at = inner
            .tree
            .find_child(ROOT, drive)
            .ok_or_else(|| FsError::DriveNotFound {
                drive: drive.to_owned(),
            })?;
        for segment in &parser.segments()[1..] {
            at = inner
                .tree
                .create_or_reuse_folder(at, segment)
                .map_err(|_| FsError::wrong_type(path.as_str(), PathKind::Directory))?;
        }
        debug!(path = %path, "created directory");
        Ok(())
    }

    fn delete_file(&self, path: &RootedCanonicalPath) -> Result<()> {
        let mut inner = self.write_lock()?;
        let id = resolve_file(&inner.tree, path)?;
        inner.tree.delete(id);
        debug!(path = %path, "deleted file");
        Ok(())
    }

    fn delete_directory(&self, path: &RootedCanonicalPath, recursive: bool) -> Result<()> {
        let mut inner = self.write_lock()?;
        let id = resolve_folder(&inner.tree, path)?;
        let node = inner
            .tree
            .node(id)
            .ok_or_else(|| FsError::not_found(path.as_str()))?;
        if node.parent == Some(ROOT) {
            return Err(FsError::invalid_operation(format!(
                "the drive '{path}' cannot be deleted"
            )));
        }
        if !recursive && !node.children().is_empty() {
            return Err(FsError::invalid_operation(format!(
                "the directory '{path}' is not empty"
            )));
        }
        inner.tree.delete(id);
        debug!(path = %path, recursive, "deleted directory");
        Ok(())
    }

    fn move_file(
        &self,
        source: &RootedCanonicalPath,
        destination: &RootedCanonicalPath,
    ) -> Result<()> {
        if source == destination {
            return Err(FsError::invalid_operation(format!(
                "cannot move '{source}' onto itself"
            )));
        }
        if !same_drive(source.as_str(), destination.as_str()) {
            return Err(FsError::invalid_operation(format!(
                "cannot move '{source}' to another drive"
            )));
        }
        let mut inner = self.write_lock()?;
        let id = resolve_file(&inner.tree, source)?;
        if resolve(&inner.tree, destination.as_str()).is_some() {
            return Err(FsError::already_exists(destination.as_str()));
        }
        let (parent, leaf) = resolve_parent(&inner.tree, destination)?;
        match inner.tree.move_node(id, parent, leaf) {
            Ok(()) => {
                debug!(source = %source, destination = %destination, "moved file");
                Ok(())
            }
            Err(TreeConflict::Occupied) => Err(FsError::already_exists(destination.as_str())),
            Err(_) => Err(FsError::invalid_operation(format!(
                "cannot move '{source}' to '{destination}'"
            ))),
        }
    }

    fn move_directory(
        &self,
        source: &RootedCanonicalPath,
        destination: &RootedCanonicalPath,
    ) -> Result<()> {
        if source == destination {
            return Err(FsError::invalid_operation(format!(
                "cannot move '{source}' onto itself"
            )));
        }
        if !same_drive(source.as_str(), destination.as_str()) {
            return Err(FsError::invalid_operation(format!(
                "cannot move '{source}' to another drive"
            )));
        }
        let mut inner = self.write_lock()?;
        let id = resolve_folder(&inner.tree, source)?;
        if inner.tree.node(id).and_then(|node| node.parent) == Some(ROOT) {
            return Err(FsError::invalid_operation(format!(
                "the drive '{source}' cannot be moved"
            )));
        }
        if resolve(&inner.tree, destination.as_str()).is_some() {
            return Err(FsError::already_exists(destination.as_str()));
        }
        let (parent, leaf) = resolve_parent(&inner.tree, destination)?;
        match inner.tree.move_node(id, parent, leaf) {
            Ok(()) => {
                debug!(source = %source, destination = %destination, "moved directory");
                Ok(())
            }
            Err(TreeConflict::Occupied) => Err(FsError::already_exists(destination.as_str())),
            Err(_) => Err(FsError::invalid_operation(format!(
                "cannot move '{source}' into its own subtree"
            ))),
        }
    }

    fn copy_file(
        &self,
        source: &RootedCanonicalPath,
        destination: &RootedCanonicalPath,
    ) -> Result<()> {
        if source == destination {
            return Err(FsError::invalid_operation(format!(
                "cannot copy '{source}' onto itself"
            )));
        }
        let mut inner = self.write_lock()?;
        let id = resolve_file(&inner.tree, source)?;
        if resolve(&inner.tree, destination.as_str()).is_some() {
            return Err(FsError::already_exists(destination.as_str()));
        }
        let (parent, leaf) = resolve_parent(&inner.tree, destination)?;
        inner
            .tree
            .copy_node(id, parent, leaf)
            .map_err(|_| FsError::already_exists(destination.as_str()))?;
        debug!(source = %source, destination = %destination, "copied file");
        Ok(())
    }

    fn copy_and_overwrite_file(
        &self,
        source: &RootedCanonicalPath,
        destination: &RootedCanonicalPath,
    ) -> Result<()> {
        if source == destination {
            return Err(FsError::invalid_operation(format!(
                "cannot copy '{source}' onto itself"
            )));
        }
        let mut inner = self.write_lock()?;
        let id = resolve_file(&inner.tree, source)?;
        if let Some(existing) = resolve(&inner.tree, destination.as_str()) {
            if !inner.tree.node(existing).is_some_and(|node| node.is_file()) {
                return Err(FsError::wrong_type(destination.as_str(), PathKind::File));
            }
            inner.tree.delete(existing);
        }
        let (parent, leaf) = resolve_parent(&inner.tree, destination)?;
        inner
            .tree
            .copy_node(id, parent, leaf)
            .map_err(|_| FsError::already_exists(destination.as_str()))?;
        debug!(source = %source, destination = %destination, "copied file over destination");
        Ok(())
    }

    fn copy_directory(
        &self,
        source: &RootedCanonicalPath,
        destination: &RootedCanonicalPath,
    ) -> Result<()> {
        if source == destination {
            return Err(FsError::invalid_operation(format!(
                "cannot copy '{source}' onto itself"
            )));
        }
        if lies_inside(source.as_str(), destination.as_str()) {
            return Err(FsError::invalid_operation(format!(
                "cannot copy '{source}' into its own subtree"
            )));
        }
        let mut inner = self.write_lock()?;
        let id = resolve_folder(&inner.tree, source)?;
        if resolve(&inner.tree, destination.as_str()).is_some() {
            return Err(FsError::already_exists(destination.as_str()));
        }
        let (parent, leaf) = resolve_parent(&inner.tree, destination)?;
        inner
            .tree
            .copy_node(id, parent, leaf)
            .map_err(|_| FsError::already_exists(destination.as_str()))?;
        debug!(source = %source, destination = %destination, "copied directory");
        Ok(())
    }

    fn create_read_stream(&self, path: &RootedCanonicalPath) -> Result<Box<dyn FileStream>> {
        let mut inner = self.write_lock()?;
        let id = resolve_file(&inner.tree, path)?;
        let node = inner
            .tree
            .node_mut(id)
            .ok_or_else(|| FsError::not_found(path.as_str()))?;
        node.times.accessed = SystemTime::now();
        let buffer = node.content().cloned().unwrap_or_default();
        let generation = node.generation;
        trace!(path = %path, "opened read stream");
        Ok(Box::new(MemoryStream::new(
            self.inner.clone(),
            id,
            generation,
            buffer,
            true,
            false,
            0,
        )))
    }

    fn create_write_stream(&self, path: &RootedCanonicalPath) -> Result<Box<dyn FileStream>> {
        let mut inner = self.write_lock()?;
        let (id, generation) = if let Some(existing) = resolve(&inner.tree, path.as_str()) {
            let node = inner
                .tree
                .node_mut(existing)
                .ok_or_else(|| FsError::not_found(path.as_str()))?;
            match node.content_mut() {
                Some(content) => {
                    content.clear();
                    node.times.modified = SystemTime::now();
                    (existing, node.generation)
                }
                None => return Err(FsError::wrong_type(path.as_str(), PathKind::File)),
            }
        } else {
            let (parent, leaf) = resolve_parent(&inner.tree, path)?;
            let id = inner
                .tree
                .create_file(parent, leaf)
                .map_err(|_| FsError::already_exists(path.as_str()))?;
            let generation = inner.tree.node(id).map(|node| node.generation).unwrap_or(0);
            (id, generation)
        };
        trace!(path = %path, "opened write stream");
        Ok(Box::new(MemoryStream::new(
            self.inner.clone(),
            id,
            generation,
            Vec::new(),
            false,
            true,
            0,
        )))
    }

    fn create_append_stream(&self, path: &RootedCanonicalPath) -> Result<Box<dyn FileStream>> {
        let mut inner = self.write_lock()?;
        let (id, generation, buffer) = open_or_create(&mut inner.tree, path)?;
        let position = buffer.len() as u64;
        trace!(path = %path, "opened append stream");
        Ok(Box::new(MemoryStream::new(
            self.inner.clone(),
            id,
            generation,
            buffer,
            false,
            true,
            position,
        )))
    }

    fn create_modify_stream(&self, path: &RootedCanonicalPath) -> Result<Box<dyn FileStream>> {
        let mut inner = self.write_lock()?;
        let (id, generation, buffer) = open_or_create(&mut inner.tree, path)?;
        trace!(path = %path, "opened modify stream");
        Ok(Box::new(MemoryStream::new(
            self.inner.clone(),
            id,
            generation,
            buffer,
            true,
            true,
            0,
        )))
    }

    fn current_directory(&self) -> Result<RootedCanonicalPath> {
        Ok(RootedCanonicalPath::new(
            self.read_lock()?.current_directory.clone(),
        ))
    }

    fn set_current_directory(&self, path: &RootedCanonicalPath) -> Result<()> {
        let mut inner = self.write_lock()?;
        resolve_folder(&inner.tree, path)?;
        inner.current_directory = path.as_str().to_owned();
        Ok(())
    }

    fn temporary_directory(&self) -> Result<RootedCanonicalPath> {
        Ok(RootedCanonicalPath::new(TEMP_DIRECTORY.to_owned()))
    }

    fn special_folder(&self, folder: SpecialFolder) -> Result<RootedCanonicalPath> {
        match special_folder_path(folder) {
            Some(path) => Ok(RootedCanonicalPath::new(path.to_owned())),
            None => Err(FsError::NotSupported {
                what: format!("{folder:?} cannot be denoted by a directory path"),
            }),
        }
    }

    fn drives(&self) -> Result<Vec<String>> {
        let inner = self.read_lock()?;
        Ok(inner
            .tree
            .node(ROOT)
            .map(|root| {
                root.children()
                    .iter()
                    .filter_map(|&child| inner.tree.node(child))
                    .map(|node| node.name.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}
