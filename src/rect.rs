use {
    smallvec::SmallVec,
    std::fmt::{Debug, Formatter},
};

#[cfg(test)]
mod tests;

#[derive(Copy, Clone, Eq, PartialEq, Default)]
pub struct Rect {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Debug for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rect")
            .field("x1", &self.x1)
            .field("y1", &self.y1)
            .field("width", &(self.x2 - self.x1))
            .field("height", &(self.y2 - self.y1))
            .finish()
    }
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Option<Self> {
        if x2 < x1 || y2 < y1 {
            return None;
        }
        Some(Self { x1, y1, x2, y2 })
    }

    pub fn new_sized(x1: i32, y1: i32, width: i32, height: i32) -> Option<Self> {
        if width < 0 || height < 0 {
            return None;
        }
        Self::new(x1, y1, x1 + width, y1 + height)
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn is_empty(&self) -> bool {
        self.x1 == self.x2 || self.y1 == self.y2
    }

    pub fn union(&self, other: Self) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    pub fn intersect(&self, other: Self) -> Self {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2).max(x1);
        let y2 = self.y2.min(other.y2).max(y1);
        Self { x1, y1, x2, y2 }
    }

    pub fn move_(&self, dx: i32, dy: i32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }
}

/// A set of rectangles covering a screen area.
///
/// Clip and damage handling only needs a covering set, not a minimal
/// one, so rectangles are kept as handed in and may overlap.
#[derive(Clone, Debug, Default)]
pub struct Region {
    rects: SmallVec<[Rect; 1]>,
}

impl Region {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(rect: Rect) -> Self {
        let mut rects = SmallVec::new();
        if !rect.is_empty() {
            rects.push(rect);
        }
        Self { rects }
    }

    pub fn from_rects(rects: &[Rect]) -> Self {
        Self {
            rects: rects.iter().copied().filter(|r| !r.is_empty()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn extents(&self) -> Rect {
        let mut iter = self.rects.iter();
        let Some(first) = iter.next() else {
            return Rect::default();
        };
        iter.fold(*first, |acc, r| acc.union(*r))
    }

    pub fn union(&self, other: &Region) -> Region {
        let mut rects = self.rects.clone();
        rects.extend(other.rects.iter().copied());
        Region { rects }
    }

    pub fn intersect(&self, other: &Region) -> Region {
        let mut rects = SmallVec::new();
        for a in &self.rects {
            for b in &other.rects {
                let r = a.intersect(*b);
                if !r.is_empty() {
                    rects.push(r);
                }
            }
        }
        Region { rects }
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Region {
        Region {
            rects: self.rects.iter().map(|r| r.move_(dx, dy)).collect(),
        }
    }
}
