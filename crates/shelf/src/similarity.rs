/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() {
    return 0.0;
  }

  let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
  let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
  let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

  if magnitude_a == 0.0 || magnitude_b == 0.0 {
    0.0
  } else {
    dot_product / (magnitude_a * magnitude_b)
  }
}

/// Euclidean distance; mismatched lengths are infinitely far apart
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() {
    return f32::INFINITY;
  }

  a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

/// Element-wise mean of equally sized vectors. None when `rows` is empty or ragged.
pub fn mean_vector<'a, I>(rows: I) -> Option<Vec<f32>>
where
  I: IntoIterator<Item = &'a [f32]>,
{
  let mut iter = rows.into_iter();
  let mut sum = iter.next()?.to_vec();
  let mut count = 1usize;

  for row in iter {
    if row.len() != sum.len() {
      return None;
    }
    sum.iter_mut().zip(row).for_each(|(acc, x)| *acc += x);
    count += 1;
  }

  sum.iter_mut().for_each(|x| *x /= count as f32);
  Some(sum)
}
