/// The two orientations a leaf can rest in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Flat,
    Turned,
}

impl Rotation {
    /// CSS `transform` value for this orientation.
    pub fn css(self) -> &'static str {
        match self {
            Rotation::Flat => "rotateY(0deg)",
            Rotation::Turned => "rotateY(-180deg)",
        }
    }
}

/// One physical page surface of the book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    pub index: usize,
    pub turned: bool,
    pub flipping: bool,
    pub z_index: i32,
    pub rotation: Rotation,
}

impl Leaf {
    pub fn new(index: usize) -> Self {
        Leaf {
            index,
            turned: false,
            flipping: false,
            z_index: 0,
            rotation: Rotation::Flat,
        }
    }

    /// Settle this leaf into its resting state for a book opened at `current`.
    pub(crate) fn rest(&mut self, current: usize, leaf_count: usize) {
        self.flipping = false;
        self.turned = self.index < current;
        if self.turned {
            self.rotation = Rotation::Turned;
            self.z_index = self.index as i32 + 1;
        } else {
            self.rotation = Rotation::Flat;
            self.z_index = (leaf_count - self.index + current) as i32;
        }
    }
}
