/// Media collaborator - turns opaque media references into displayable URLs.
pub trait MediaResolver: Send + Sync {
    fn resolve(&self, media_id: &str) -> String;

    fn resolve_all(&self, media_ids: &[String]) -> Vec<String> {
        media_ids.iter().map(|id| self.resolve(id)).collect()
    }
}
