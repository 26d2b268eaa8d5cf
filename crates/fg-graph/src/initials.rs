//! Initial information packet (IIP) mutations.

use fg_core::{IipData, Metadata};

use crate::event::GraphEvent;
use crate::graph::{Endpoint, Graph, Initializer};
use crate::outcome::{Outcome, Skip};

impl Graph {
    /// Send `data` to `node.port` at network start-up.
    pub fn add_initial(
        &mut self,
        data: IipData,
        node: &str,
        port: &str,
        metadata: Option<Metadata>,
    ) -> Outcome {
        self.add_initial_index(data, node, port, None, metadata)
    }

    /// Send `data` to a specific index of an array inport.
    pub fn add_initial_index(
        &mut self,
        data: IipData,
        node: &str,
        port: &str,
        index: Option<u32>,
        metadata: Option<Metadata>,
    ) -> Outcome {
        if self.node(node).is_none() {
            return self.skip(Skip::UnknownNode {
                id: node.to_string(),
            });
        }

        let port = self.port_name(port);
        self.begin();
        let initializer = Initializer {
            data,
            to: Endpoint::new(node, port).with_index(index),
            metadata,
        };
        self.initializers.push(initializer.clone());
        self.emit(GraphEvent::AddInitial(initializer));
        self.finish()
    }

    /// Send `data` to whatever node port the public inport `name` aliases.
    pub fn add_graph_initial(&mut self, data: IipData, name: &str, metadata: Option<Metadata>) -> Outcome {
        self.add_graph_initial_index(data, name, None, metadata)
    }

    pub fn add_graph_initial_index(
        &mut self,
        data: IipData,
        name: &str,
        index: Option<u32>,
        metadata: Option<Metadata>,
    ) -> Outcome {
        let name = self.port_name(name);
        let Some(inport) = self.inports.get(&name) else {
            return self.skip(Skip::UnknownInport { name });
        };
        let (process, port) = (inport.process.clone(), inport.port.clone());
        self.add_initial_index(data, &process, &port, index, metadata)
    }

    /// Remove initializers targeting `node.port`, or every initializer
    /// targeting `node` when `port` is `None`. Emits one `removeInitial` per
    /// removed packet.
    pub fn remove_initial(&mut self, node: &str, port: Option<&str>) -> Outcome {
        let port = port.map(|p| self.port_name(p));
        let matches = |i: &Initializer| {
            i.to.node == node && port.as_deref().is_none_or(|p| i.to.port == p)
        };

        if !self.initializers.iter().any(matches) {
            return self.skip(Skip::UnknownInitial {
                node: node.to_string(),
                port,
            });
        }

        self.begin();
        let (removed, kept): (Vec<Initializer>, Vec<Initializer>) =
            std::mem::take(&mut self.initializers)
                .into_iter()
                .partition(matches);
        self.initializers = kept;
        for initializer in removed {
            self.emit(GraphEvent::RemoveInitial(initializer));
        }
        self.finish()
    }

    /// Remove the initializers sent through public inport `name`.
    pub fn remove_graph_initial(&mut self, name: &str) -> Outcome {
        let name = self.port_name(name);
        let Some(inport) = self.inports.get(&name) else {
            return self.skip(Skip::UnknownInport { name });
        };
        let (process, port) = (inport.process.clone(), inport.port.clone());
        self.remove_initial(&process, Some(&port))
    }
}
