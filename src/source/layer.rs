/// One way of recognising the layer for an administrative depth by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerStrategy {
    /// Name ends with `_{depth}`, e.g. `gadm41_IND_3`.
    DepthSuffix,
    /// Name ends with `ADM_{depth}` or `_L{depth}`, ignoring case.
    AdmSuffix,
    /// Name contains the depth digit anywhere.
    ContainsDepth,
    /// Whatever layer comes last in the archive.
    Last,
}

impl LayerStrategy {
    fn matches(&self, name: &str, depth: u8) -> bool {
        match self {
            LayerStrategy::DepthSuffix => name.ends_with(&format!("_{depth}")),
            LayerStrategy::AdmSuffix => {
                let upper = name.to_ascii_uppercase();
                upper.ends_with(&format!("ADM_{depth}")) || upper.ends_with(&format!("_L{depth}"))
            }
            LayerStrategy::ContainsDepth => name.contains(&depth.to_string()),
            LayerStrategy::Last => true,
        }
    }

    /// First layer (listing order) this strategy accepts; `Last` takes the final one.
    pub fn select<'a>(&self, layers: &'a [String], depth: u8) -> Option<&'a str> {
        let layer = match self {
            LayerStrategy::Last => layers.last(),
            _ => layers.iter().find(|name| self.matches(name, depth)),
        };
        layer.map(String::as_str)
    }
}

/// How hard to try before giving up on finding a layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayerPolicy {
    /// Only name-based strategies; no match is an error.
    #[default]
    Strict,
    /// Fall back to the last layer when no name matches.
    BestEffort,
}

impl LayerPolicy {
    /// Strategies to try, highest rank first.
    pub fn strategies(self) -> &'static [LayerStrategy] {
        match self {
            LayerPolicy::Strict => &[
                LayerStrategy::DepthSuffix,
                LayerStrategy::AdmSuffix,
                LayerStrategy::ContainsDepth,
            ],
            LayerPolicy::BestEffort => &[
                LayerStrategy::DepthSuffix,
                LayerStrategy::AdmSuffix,
                LayerStrategy::ContainsDepth,
                LayerStrategy::Last,
            ],
        }
    }
}

/// Pick the layer for `depth`: the answer of the first strategy that has one.
///
/// Ranking is strategy-first: a `_3` suffix anywhere in the archive beats an
/// `_L3` layer listed earlier.
pub fn select_layer(layers: &[String], depth: u8, policy: LayerPolicy) -> Option<(&str, LayerStrategy)> {
    policy.strategies().iter()
        .find_map(|strategy| strategy.select(layers, depth).map(|layer| (layer, *strategy)))
}
