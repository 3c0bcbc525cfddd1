use crate::config::ArtworkSettings;
use crate::sources::{ArtworkSource, Candidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub min_res: u32,
    /// Scan every source and keep the largest qualifying image.
    pub hires_priority: bool,
    /// Accept a below-threshold image when nothing qualifies.
    pub fallback: bool,
    /// Never return a below-threshold image. Wins over `fallback`.
    pub no_low_res: bool,
}

impl From<&ArtworkSettings> for Policy {
    fn from(settings: &ArtworkSettings) -> Self {
        Self {
            min_res: settings.min_res,
            hires_priority: settings.use_hires_priority,
            fallback: settings.use_fallback,
            no_low_res: settings.no_low_res,
        }
    }
}

#[derive(Debug)]
pub enum Lookup {
    Found(Candidate),
    NotFound,
}

pub struct Resolver {
    sources: Vec<Box<dyn ArtworkSource>>,
    policy: Policy,
}

impl Resolver {
    #[must_use]
    pub fn new(sources: Vec<Box<dyn ArtworkSource>>, policy: Policy) -> Self {
        Self { sources, policy }
    }

    pub fn resolve(&self, artist: &str, album: &str) -> Lookup {
        let mut best: Option<Candidate> = None;
        let mut low_res: Option<Candidate> = None;

        for source in &self.sources {
            let candidates = match source.lookup(artist, album) {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!("{} lookup failed for {artist} - {album}: {e:#}", source.kind());
                    continue;
                }
            };
            tracing::debug!(
                "{} returned {} candidate(s) for {artist} - {album}",
                source.kind(),
                candidates.len()
            );

            for candidate in candidates {
                if candidate.resolution().meets(self.policy.min_res) {
                    if !self.policy.hires_priority {
                        return Lookup::Found(candidate);
                    }
                    if is_larger(&candidate, best.as_ref()) {
                        best = Some(candidate);
                    }
                } else if low_res.is_none() {
                    low_res = Some(candidate);
                }
            }
        }

        if let Some(best) = best {
            return Lookup::Found(best);
        }

        match low_res {
            Some(candidate) if self.policy.fallback && !self.policy.no_low_res => {
                tracing::info!(
                    "Settling for {} artwork at {} (below {}px)",
                    candidate.source,
                    candidate.resolution(),
                    self.policy.min_res
                );
                Lookup::Found(candidate)
            }
            _ => Lookup::NotFound,
        }
    }
}

fn is_larger(candidate: &Candidate, current: Option<&Candidate>) -> bool {
    current.is_none_or(|current| candidate.resolution().area() > current.resolution().area())
}
