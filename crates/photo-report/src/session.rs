//! The ordered photo list of one report
//!
//! Items keep a dense `0..N-1` order: every insertion, removal and move
//! renumbers the list so `items()[i].order == i` always holds.

use crate::codec::ImageCodec;
use crate::types::*;
use std::path::Path;
use std::sync::Arc;

/// A decoded input photo. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub id: ImageId,
    /// Original file name, if known
    pub name: String,
    /// Encoded bytes as supplied
    pub bytes: Arc<Vec<u8>>,
    /// Identifies the content independently of `id`
    pub hash: ContentHash,
    pub width: u32,
    pub height: u32,
}

impl SourceImage {
    /// Decode `bytes` to learn the pixel dimensions
    pub fn decode<C: ImageCodec>(
        codec: &C,
        id: ImageId,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> std::result::Result<Self, DecodeError> {
        let name = name.into();
        let surface = codec.decode(&bytes).map_err(|e| e.named(name.clone()))?;
        let (width, height) = codec.dimensions(&surface);
        Ok(Self {
            id,
            name,
            hash: ContentHash::of(&bytes),
            bytes: Arc::new(bytes),
            width,
            height,
        })
    }
}

/// Decode on the blocking pool
pub async fn ingest<C: ImageCodec>(
    codec: Arc<C>,
    id: ImageId,
    name: String,
    bytes: Vec<u8>,
) -> Result<SourceImage> {
    let source =
        tokio::task::spawn_blocking(move || SourceImage::decode(codec.as_ref(), id, name, bytes))
            .await??;
    Ok(source)
}

/// One photo of the report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportItem {
    /// Position in the report, dense from zero
    pub order: usize,
    pub source: Arc<SourceImage>,
    pub caption: String,
}

impl ReportItem {
    pub fn id(&self) -> ImageId {
        self.source.id
    }
}

/// Explicit ordered collection of report items
#[derive(Debug, Default)]
pub struct ReportSession {
    items: Vec<ReportItem>,
    next_id: u64,
}

impl ReportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh image id
    pub fn allocate_id(&mut self) -> ImageId {
        let id = ImageId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append an already decoded image at the end of the report
    pub fn add(&mut self, source: SourceImage) -> ImageId {
        let id = source.id;
        if id.0 >= self.next_id {
            self.next_id = id.0 + 1;
        }
        self.items.push(ReportItem {
            order: self.items.len(),
            source: Arc::new(source),
            caption: String::new(),
        });
        id
    }

    /// Decode and append a photo.
    ///
    /// Decode failures leave the session unchanged.
    pub async fn ingest<C: ImageCodec>(
        &mut self,
        codec: &Arc<C>,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<ImageId> {
        let id = self.allocate_id();
        let source = ingest(Arc::clone(codec), id, name.into(), bytes).await?;
        Ok(self.add(source))
    }

    /// Read, decode and append a photo file
    pub async fn ingest_file<C: ImageCodec>(
        &mut self,
        codec: &Arc<C>,
        path: impl AsRef<Path>,
    ) -> Result<ImageId> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.ingest(codec, name, bytes).await
    }

    pub fn items(&self) -> &[ReportItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ImageId) -> Option<&ReportItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Current position of `id`
    pub fn position(&self, id: ImageId) -> Result<usize> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(ReportError::UnknownItem(id))
    }

    /// Remove an item; later items move up by one
    pub fn remove(&mut self, id: ImageId) -> Result<ReportItem> {
        let index = self.position(id)?;
        let item = self.items.remove(index);
        self.renumber();
        log::debug!("removed {} ({} items left)", id, self.items.len());
        Ok(item)
    }

    /// Move an item by `delta` positions, clamped to the list bounds.
    ///
    /// Returns the new position.
    pub fn move_by(&mut self, id: ImageId, delta: isize) -> Result<usize> {
        let from = self.position(id)?;
        let last = self.items.len() as isize - 1;
        let to = (from as isize + delta).clamp(0, last) as usize;
        self.relocate(from, to);
        Ok(to)
    }

    /// Move an item to `index`, clamped to the last position
    pub fn move_to(&mut self, id: ImageId, index: usize) -> Result<usize> {
        let from = self.position(id)?;
        let to = index.min(self.items.len() - 1);
        self.relocate(from, to);
        Ok(to)
    }

    pub fn set_caption(&mut self, id: ImageId, caption: impl Into<String>) -> Result<()> {
        let index = self.position(id)?;
        self.items[index].caption = caption.into();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn relocate(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.renumber();
    }

    fn renumber(&mut self) {
        for (order, item) in self.items.iter_mut().enumerate() {
            item.order = order;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::mock::MockCodec;

    fn session_with(count: usize) -> (ReportSession, Vec<ImageId>) {
        let codec = MockCodec::new();
        let mut session = ReportSession::new();
        let ids = (0..count)
            .map(|i| {
                let id = session.allocate_id();
                let source = SourceImage::decode(
                    &codec,
                    id,
                    format!("foto{}.jpg", i),
                    MockCodec::image_bytes(800, 600),
                )
                .unwrap();
                session.add(source)
            })
            .collect();
        (session, ids)
    }

    fn order_of(session: &ReportSession) -> Vec<ImageId> {
        session.items().iter().map(|item| item.id()).collect()
    }

    fn assert_dense(session: &ReportSession) {
        for (i, item) in session.items().iter().enumerate() {
            assert_eq!(item.order, i);
        }
    }

    #[test]
    fn test_add_appends_in_order() {
        let (session, ids) = session_with(3);
        assert_eq!(order_of(&session), ids);
        assert_dense(&session);
        assert_eq!(session.get(ids[1]).unwrap().source.name, "foto1.jpg");
    }

    #[test]
    fn test_remove_renumbers() {
        let (mut session, ids) = session_with(4);
        let removed = session.remove(ids[1]).unwrap();
        assert_eq!(removed.id(), ids[1]);
        assert_eq!(order_of(&session), vec![ids[0], ids[2], ids[3]]);
        assert_dense(&session);
    }

    #[test]
    fn test_move_up_and_back_restores_order() {
        let (mut session, ids) = session_with(4);
        assert_eq!(session.move_by(ids[2], -1).unwrap(), 1);
        assert_eq!(order_of(&session), vec![ids[0], ids[2], ids[1], ids[3]]);
        assert_dense(&session);

        session.move_by(ids[2], 1).unwrap();
        assert_eq!(order_of(&session), ids);
        assert_dense(&session);
    }

    #[test]
    fn test_move_by_clamps() {
        let (mut session, ids) = session_with(3);
        assert_eq!(session.move_by(ids[0], -5).unwrap(), 0);
        assert_eq!(order_of(&session), ids);
        assert_eq!(session.move_by(ids[0], 10).unwrap(), 2);
        assert_eq!(order_of(&session), vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_move_to_position() {
        let (mut session, ids) = session_with(4);
        session.move_to(ids[3], 0).unwrap();
        assert_eq!(order_of(&session), vec![ids[3], ids[0], ids[1], ids[2]]);
        assert_eq!(session.move_to(ids[3], 99).unwrap(), 3);
        assert_eq!(order_of(&session), ids);
        assert_dense(&session);
    }

    #[test]
    fn test_set_caption() {
        let (mut session, ids) = session_with(2);
        session.set_caption(ids[1], "Entrada principal").unwrap();
        assert_eq!(session.items()[1].caption, "Entrada principal");
        assert_eq!(session.items()[0].caption, "");
    }

    #[test]
    fn test_unknown_item() {
        let (mut session, _) = session_with(1);
        let missing = ImageId(42);
        assert!(matches!(
            session.remove(missing),
            Err(ReportError::UnknownItem(id)) if id == missing
        ));
        assert!(session.set_caption(missing, "x").is_err());
        assert!(session.move_by(missing, 1).is_err());
    }

    #[tokio::test]
    async fn test_ingest_decode_failure_leaves_session_unchanged() {
        let codec = Arc::new(MockCodec::new());
        let mut session = ReportSession::new();
        session
            .ingest(&codec, "boa.jpg", MockCodec::image_bytes(640, 480))
            .await
            .unwrap();

        match session.ingest(&codec, "quebrada.jpg", b"nope".to_vec()).await {
            Err(ReportError::Decode(err)) => assert_eq!(err.name, "quebrada.jpg"),
            other => panic!("Expected Decode error, got {:?}", other),
        }
        assert_eq!(session.len(), 1);
        assert_eq!(session.items()[0].source.width, 640);
    }
}
