// ============================================================================
// Sampler : sous-échantillonnage déterministe d'une série ordonnée
// ============================================================================
// Réduit une série arbitrairement longue à ~target points en gardant :
// - l'ordre d'origine
// - le premier point (index 0)
// - le dernier point (index n-1), toujours, quel que soit le pas
//
// Le dernier point est lu en aval (prix courant, RSI courant...) : le perdre
// afficherait des valeurs périmées.
// ============================================================================

/// Nombre de points visé par défaut pour les graphiques
pub const DEFAULT_SAMPLE_TARGET: usize = 30;

/// Pas d'échantillonnage : max(1, floor(n / target))
///
/// Un target de 0 est traité comme 1.
pub fn sample_step(len: usize, target: usize) -> usize {
    (len / target.max(1)).max(1)
}

/// Indices retenus dans la série d'origine, strictement croissants
pub fn sample_indices(len: usize, target: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }

    let step = sample_step(len, target);

    // CONCEPT RUST : step_by
    // - (0..len).step_by(step) == tous les i tels que i % step == 0
    let mut indices: Vec<usize> = (0..len).step_by(step).collect();

    let last = len - 1;
    if indices.last() != Some(&last) {
        indices.push(last);
    }

    indices
}

/// Échantillonne une série ordonnée
///
/// CONCEPT RUST : Générique avec Clone
/// - Fonctionne pour RawPoint comme pour n'importe quel point
pub fn sample<T: Clone>(points: &[T], target: usize) -> Vec<T> {
    sample_indices(points.len(), target)
        .into_iter()
        .map(|i| points[i].clone())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let empty: Vec<u32> = Vec::new();
        assert!(sample(&empty, 30).is_empty());
    }

    #[test]
    fn test_short_input_is_kept_whole() {
        let points: Vec<u32> = (0..10).collect();
        assert_eq!(sample(&points, 30), points);
    }

    #[test]
    fn test_400_points_keep_last() {
        let points: Vec<u32> = (0..400).collect();
        assert_eq!(sample_step(400, 30), 13);

        let sampled = sample(&points, 30);
        // 0, 13, ..., 390 (31 points) puis 399 ajouté
        assert_eq!(sampled.len(), 32);
        assert_eq!(sampled.first(), Some(&0));
        assert_eq!(sampled[30], 390);
        assert_eq!(sampled.last(), Some(&399));
    }

    #[test]
    fn test_last_not_duplicated_when_aligned() {
        // n = 61, step = 2 : l'index 60 est déjà retenu
        let points: Vec<u32> = (0..61).collect();
        let sampled = sample(&points, 30);
        assert_eq!(sampled.len(), 31);
        assert_eq!(sampled.last(), Some(&60));
    }

    #[test]
    fn test_bounds_and_order_for_many_lengths() {
        for len in 1..500 {
            let step = sample_step(len, 30);
            let indices = sample_indices(len, 30);

            assert!(!indices.is_empty());
            assert!(indices.len() <= len / step + 2);
            assert_eq!(indices[0], 0);
            assert_eq!(*indices.last().unwrap(), len - 1);
            assert!(indices.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_zero_target_does_not_panic() {
        // target 0 → target 1 → pas = n : premier et dernier points
        let points: Vec<u32> = (0..5).collect();
        assert_eq!(sample(&points, 0), vec![0, 4]);
    }
}
